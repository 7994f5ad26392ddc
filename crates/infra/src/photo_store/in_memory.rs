use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use catalog_core::{ExpectedVersion, PhotoId, ProductId};

use super::r#trait::{PhotoStore, PhotoStoreError, StoredPhotoEvent, UncommittedPhotoEvent};

/// In-memory photo event store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryPhotoStore {
    streams: RwLock<HashMap<ProductId, Vec<StoredPhotoEvent>>>,
    next_photo_id: AtomicU64,
}

impl Default for InMemoryPhotoStore {
    fn default() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            next_photo_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[StoredPhotoEvent]) -> u64 {
        stream.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl PhotoStore for InMemoryPhotoStore {
    fn next_photo_id(&self) -> PhotoId {
        PhotoId::new(self.next_photo_id.fetch_add(1, Ordering::SeqCst))
    }

    fn append(
        &self,
        product_id: ProductId,
        events: Vec<UncommittedPhotoEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredPhotoEvent>, PhotoStoreError> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        if let Some((idx, _)) = events
            .iter()
            .enumerate()
            .find(|(_, e)| e.product_id != product_id)
        {
            return Err(PhotoStoreError::InvalidAppend(format!(
                "batch targets another product (index {idx})"
            )));
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|_| PhotoStoreError::InvalidAppend("lock poisoned".to_string()))?;

        let stream = streams.entry(product_id).or_default();
        let current = Self::current_version(stream);

        if !expected_version.matches(current) {
            return Err(PhotoStoreError::Concurrency(format!(
                "expected {expected_version:?}, found {current}"
            )));
        }

        let mut next = current + 1;
        let mut committed = Vec::with_capacity(events.len());
        for e in events {
            let stored = StoredPhotoEvent {
                event_id: e.event_id,
                product_id: e.product_id,
                sequence_number: next,
                event_type: e.event_type,
                event_version: e.event_version,
                occurred_at: e.occurred_at,
                payload: e.payload,
            };
            next += 1;
            stream.push(stored.clone());
            committed.push(stored);
        }

        Ok(committed)
    }

    fn load_stream(&self, product_id: ProductId) -> Result<Vec<StoredPhotoEvent>, PhotoStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| PhotoStoreError::InvalidAppend("lock poisoned".to_string()))?;

        Ok(streams.get(&product_id).cloned().unwrap_or_default())
    }

    fn remove_stream(&self, product_id: ProductId) -> Result<(), PhotoStoreError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| PhotoStoreError::InvalidAppend("lock poisoned".to_string()))?;
        streams.remove(&product_id);
        Ok(())
    }
}
