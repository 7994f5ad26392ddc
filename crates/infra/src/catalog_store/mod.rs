//! Families, categories and products (everything except photos).

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use r#trait::CatalogRepository;
