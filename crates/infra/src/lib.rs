//! Infrastructure layer: storage adapters, photo store, catalog services,
//! config.

pub mod catalog_service;
pub mod catalog_store;
pub mod config;
pub mod error;
pub mod listing;
pub mod photo_dispatcher;
pub mod photo_manager;
pub mod photo_store;
pub mod storage;

#[cfg(test)]
mod integration_tests;

pub use catalog_service::{
    CatalogService, ProductChange, ProductDeletion, ProductDeletionCheck, ProductDetails,
};
pub use error::{BatchItem, CatalogError, ItemFailure, PhotoError};
pub use photo_manager::{BatchMode, PhotoBatchReport, PhotoChanges, PhotoManager, PhotoUpload};

use catalog_store::InMemoryCatalogStore;
use config::Config;
use photo_store::InMemoryPhotoStore;
use storage::LocalDiskStorage;

/// Catalog backed by in-memory records and photos on the local public disk.
pub type LocalCatalog = CatalogService<InMemoryCatalogStore, InMemoryPhotoStore, LocalDiskStorage>;

/// Wire a [`LocalCatalog`] from configuration.
pub fn local_catalog(config: &Config) -> LocalCatalog {
    let storage = LocalDiskStorage::new(config.storage.root.clone(), config.storage.photo_dir.clone());
    let photos = PhotoManager::new(InMemoryPhotoStore::new(), storage)
        .with_max_image_bytes(config.storage.max_photo_bytes);
    CatalogService::new(InMemoryCatalogStore::new(), photos).with_page_size(config.catalog.page_size)
}
