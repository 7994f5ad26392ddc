use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use catalog_core::{Event, ExpectedVersion, PhotoId, ProductId};
use catalog_products::PhotoEvent;

/// A photo event ready to be appended (no sequence number yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedPhotoEvent {
    pub event_id: Uuid,
    pub product_id: ProductId,
    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
    pub payload: JsonValue,
}

impl UncommittedPhotoEvent {
    pub fn from_typed(product_id: ProductId, event: &PhotoEvent) -> Result<Self, PhotoStoreError> {
        let payload = serde_json::to_value(event)
            .map_err(|e| PhotoStoreError::Serialization(e.to_string()))?;
        Ok(Self {
            event_id: Uuid::now_v7(),
            product_id,
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}

/// A persisted photo event with its position in the product's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPhotoEvent {
    pub event_id: Uuid,
    pub product_id: ProductId,

    /// Position in the product stream, starting at 1.
    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
    pub payload: JsonValue,
}

impl StoredPhotoEvent {
    pub fn to_typed(&self) -> Result<PhotoEvent, PhotoStoreError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            PhotoStoreError::Serialization(format!(
                "{} #{}: {e}",
                self.event_type, self.sequence_number
            ))
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhotoStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("event serialization failed: {0}")]
    Serialization(String),
}

/// Per-product append-only store of photo events.
///
/// Implementations must:
/// - reject appends whose `ExpectedVersion` does not match the stream;
/// - append a batch atomically (readers see all of it or none of it);
/// - hand out photo ids that increase in allocation order.
pub trait PhotoStore: Send + Sync {
    /// Allocate the next photo id.
    fn next_photo_id(&self) -> PhotoId;

    fn append(
        &self,
        product_id: ProductId,
        events: Vec<UncommittedPhotoEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredPhotoEvent>, PhotoStoreError>;

    /// Full stream of a product; empty if it never had photos.
    fn load_stream(&self, product_id: ProductId) -> Result<Vec<StoredPhotoEvent>, PhotoStoreError>;

    /// Drop a product's stream entirely (product deletion).
    fn remove_stream(&self, product_id: ProductId) -> Result<(), PhotoStoreError>;
}

impl<S> PhotoStore for Arc<S>
where
    S: PhotoStore + ?Sized,
{
    fn next_photo_id(&self) -> PhotoId {
        (**self).next_photo_id()
    }

    fn append(
        &self,
        product_id: ProductId,
        events: Vec<UncommittedPhotoEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredPhotoEvent>, PhotoStoreError> {
        (**self).append(product_id, events, expected_version)
    }

    fn load_stream(&self, product_id: ProductId) -> Result<Vec<StoredPhotoEvent>, PhotoStoreError> {
        (**self).load_stream(product_id)
    }

    fn remove_stream(&self, product_id: ProductId) -> Result<(), PhotoStoreError> {
        (**self).remove_stream(product_id)
    }
}
