use std::sync::Arc;

use thiserror::Error;

use catalog_products::{ImageFormat, ImageUpload};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored image not found: {0}")]
    NotFound(String),

    /// The backend refused the request (bad reference, injected failure).
    #[error("storage rejected request: {0}")]
    Rejected(String),
}

/// Where product images live.
///
/// `store` must either persist the image and return its reference, or fail
/// without leaving anything behind. `delete` is used best-effort by callers.
pub trait ImageStorage: Send + Sync {
    /// Persist an already validated image and return its reference
    /// (e.g. `products/0190c0de....jpg`).
    fn store(&self, image: &ImageUpload, format: ImageFormat) -> Result<String, StorageError>;

    /// Remove a previously stored image.
    fn delete(&self, reference: &str) -> Result<(), StorageError>;
}

impl<S> ImageStorage for Arc<S>
where
    S: ImageStorage + ?Sized,
{
    fn store(&self, image: &ImageUpload, format: ImageFormat) -> Result<String, StorageError> {
        (**self).store(image, format)
    }

    fn delete(&self, reference: &str) -> Result<(), StorageError> {
        (**self).delete(reference)
    }
}
