//! `catalog-core`: domain foundation for the catalog.
//!
//! Pure building blocks only: errors, identifiers, entity/aggregate traits.
//! Nothing in here performs IO.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod validate;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{CategoryId, FamilyId, PhotoId, ProductId};
pub use value_object::ValueObject;
