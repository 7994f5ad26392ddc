//! Command execution for product photo collections.
//!
//! ```text
//! PhotoCommand
//!   -> load the product stream
//!   -> rehydrate ProductPhotos
//!   -> handle (pure, decides events)
//!   -> append with ExpectedVersion::Exact(stream version)
//! ```
//!
//! A command's events are appended as one batch, so no reader ever sees a
//! half-applied profile change.

use catalog_core::{Aggregate, AggregateRoot, ExpectedVersion, ProductId};
use catalog_products::{PhotoCommand, PhotoEvent, ProductPhotos};

use crate::error::PhotoError;
use crate::photo_store::{PhotoStore, PhotoStoreError, StoredPhotoEvent, UncommittedPhotoEvent};

/// Outcome of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Domain events decided by the aggregate, in order.
    pub events: Vec<PhotoEvent>,
    /// The same events as persisted (with sequence numbers).
    pub committed: Vec<StoredPhotoEvent>,
    /// Photo collection after the events were applied.
    pub photos: ProductPhotos,
}

#[derive(Debug)]
pub struct PhotoDispatcher<S> {
    store: S,
}

impl<S> PhotoDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: PhotoStore> PhotoDispatcher<S> {
    /// Current photo collection of a product.
    pub fn load(&self, product_id: ProductId) -> Result<ProductPhotos, PhotoError> {
        let history = self.store.load_stream(product_id)?;
        validate_loaded_stream(product_id, &history)?;

        let mut photos = ProductPhotos::empty(product_id);
        apply_history(&mut photos, &history)?;
        Ok(photos)
    }

    pub fn dispatch(&self, command: PhotoCommand) -> Result<Dispatched, PhotoError> {
        let product_id = command.product_id();

        let mut photos = self.load(product_id)?;
        let expected = ExpectedVersion::Exact(photos.version());

        let decided = photos.handle(&command)?;
        if decided.is_empty() {
            return Ok(Dispatched {
                events: vec![],
                committed: vec![],
                photos,
            });
        }

        let uncommitted = decided
            .iter()
            .map(|ev| UncommittedPhotoEvent::from_typed(product_id, ev))
            .collect::<Result<Vec<_>, _>>()?;
        let committed = self.store.append(product_id, uncommitted, expected)?;

        for event in &decided {
            photos.apply(event);
        }

        Ok(Dispatched {
            events: decided,
            committed,
            photos,
        })
    }
}

fn validate_loaded_stream(
    product_id: ProductId,
    stream: &[StoredPhotoEvent],
) -> Result<(), PhotoStoreError> {
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.product_id != product_id {
            return Err(PhotoStoreError::InvalidAppend(format!(
                "loaded stream contains wrong product_id at index {idx}"
            )));
        }
        if e.sequence_number <= last {
            return Err(PhotoStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            )));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history(
    photos: &mut ProductPhotos,
    history: &[StoredPhotoEvent],
) -> Result<(), PhotoStoreError> {
    for stored in history {
        photos.apply(&stored.to_typed()?);
    }
    Ok(())
}
