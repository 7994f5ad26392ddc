//! Catalog taxonomy: families and the categories grouped under them.
//!
//! Plain validated entities (no IO). Referential checks such as "does this
//! family exist" need a store and live in the infra layer.

pub mod category;
pub mod family;
pub mod seed;

pub use category::{Category, CategoryDraft};
pub use family::{Family, FamilyDraft};
pub use seed::default_families;
