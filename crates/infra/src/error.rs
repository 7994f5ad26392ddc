//! Errors surfaced by the infra services.

use thiserror::Error;

use catalog_core::{DomainError, PhotoId};

use crate::photo_store::PhotoStoreError;
use crate::storage::StorageError;

/// Which item of a batch a failure refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatchItem {
    /// Position of an upload in the submitted batch.
    Upload(usize),
    /// An existing photo named by the request.
    Photo(PhotoId),
}

impl core::fmt::Display for BatchItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BatchItem::Upload(idx) => write!(f, "upload #{idx}"),
            BatchItem::Photo(id) => write!(f, "photo {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item: BatchItem,
    pub error: PhotoError,
}

impl ItemFailure {
    pub fn new(item: BatchItem, error: impl Into<PhotoError>) -> Self {
        Self {
            item,
            error: error.into(),
        }
    }
}

/// Photo operation error, as seen by request handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// Unreadable image or malformed reference.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Photo (or product) not owned by the addressed product.
    #[error("not found: {0}")]
    NotFound(String),

    /// The image could not be stored or removed.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// Stale version or duplicate identifier.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The photo store itself failed (serialization, poisoned lock).
    #[error("photo store error: {0}")]
    Store(String),

    /// All-or-nothing batch rejected; nothing was changed.
    #[error("batch aborted: {} item(s) failed", .0.len())]
    BatchAborted(Vec<ItemFailure>),
}

impl From<DomainError> for PhotoError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::InvalidId(msg) => PhotoError::InvalidInput(msg),
            DomainError::NotFound(msg) => PhotoError::NotFound(msg),
            DomainError::Conflict(msg) => PhotoError::Conflict(msg),
            DomainError::InvariantViolation(msg) => PhotoError::Invariant(msg),
        }
    }
}

impl From<StorageError> for PhotoError {
    fn from(value: StorageError) -> Self {
        PhotoError::StorageFailure(value.to_string())
    }
}

impl From<PhotoStoreError> for PhotoError {
    fn from(value: PhotoStoreError) -> Self {
        match value {
            PhotoStoreError::Concurrency(msg) => PhotoError::Conflict(msg),
            other => PhotoError::Store(other.to_string()),
        }
    }
}

/// Catalog (taxonomy + product) operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced family or category does not exist.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate product code.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Photo(#[from] PhotoError),

    #[error("catalog store error: {0}")]
    Store(String),
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                CatalogError::Validation(msg)
            }
            DomainError::InvalidInput(msg) => CatalogError::InvalidInput(msg),
            DomainError::NotFound(msg) => CatalogError::NotFound(msg),
            DomainError::Conflict(msg) => CatalogError::Conflict(msg),
            DomainError::InvariantViolation(msg) => CatalogError::Invariant(msg),
        }
    }
}
