//! Append-only photo event streams, one per product.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryPhotoStore;
pub use r#trait::{PhotoStore, PhotoStoreError, StoredPhotoEvent, UncommittedPhotoEvent};
