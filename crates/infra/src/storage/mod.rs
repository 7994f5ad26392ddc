//! Image storage boundary.
//!
//! The photo services only need two things from storage: put bytes somewhere
//! and get an opaque reference back, and delete by that reference.

pub mod in_memory;
pub mod local_disk;
pub mod r#trait;

pub use in_memory::InMemoryImageStorage;
pub use local_disk::LocalDiskStorage;
pub use r#trait::{ImageStorage, StorageError};
