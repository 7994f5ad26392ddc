//! Product photo operations with storage side effects.
//!
//! [`PhotoManager`] sits between request handlers and the `ProductPhotos`
//! aggregate. It validates and stores uploads, filters out ids the product
//! does not own, dispatches one command per call and removes stored files of
//! deleted photos.
//!
//! Batch semantics:
//! - [`BatchMode::BestEffort`]: failed items are reported in
//!   [`PhotoBatchReport::failed`] and everything else is committed.
//! - [`BatchMode::AllOrNothing`]: any failed item aborts the call with
//!   [`PhotoError::BatchAborted`]; no record changes and files stored by the
//!   call are removed again.
//!
//! Removing a stored file is always best-effort: a failure is logged and
//! reported in [`PhotoBatchReport::cleanup_failures`], the record is gone
//! regardless.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use catalog_core::{PhotoId, ProductId};
use catalog_products::image::DEFAULT_MAX_IMAGE_BYTES;
use catalog_products::{
    AttachPhotos, CompositeUpdate, DeletePhotos, ImageUpload, IncomingPhoto, Photo,
    PhotoCommand, PhotoEvent, ProductPhotos, ReassignProfile,
};

use crate::error::{BatchItem, ItemFailure, PhotoError};
use crate::photo_dispatcher::{Dispatched, PhotoDispatcher};
use crate::photo_store::PhotoStore;
use crate::storage::ImageStorage;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BatchMode {
    #[default]
    BestEffort,
    AllOrNothing,
}

/// One image submitted for a product, optionally asking to be its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub image: ImageUpload,
    pub requested_profile: bool,
}

impl PhotoUpload {
    pub fn new(image: ImageUpload) -> Self {
        Self {
            image,
            requested_profile: false,
        }
    }

    pub fn as_profile(mut self) -> Self {
        self.requested_profile = true;
        self
    }
}

/// Photo changes submitted by a product edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhotoChanges {
    pub new_photos: Vec<PhotoUpload>,
    pub delete_ids: Vec<PhotoId>,
    pub reassign_to: Option<PhotoId>,
}

impl PhotoChanges {
    pub fn is_empty(&self) -> bool {
        self.new_photos.is_empty() && self.delete_ids.is_empty() && self.reassign_to.is_none()
    }
}

/// What a photo operation did, for the caller to summarize.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhotoBatchReport {
    pub attached: Vec<PhotoId>,
    pub removed: Vec<PhotoId>,
    /// Photo that received the profile flag through this call, if any.
    pub profile_assigned: Option<PhotoId>,
    pub failed: Vec<ItemFailure>,
    /// Stored files that could not be removed (records are gone anyway).
    pub cleanup_failures: Vec<ItemFailure>,
    /// Resulting profile photo of the product.
    pub profile_photo: Option<PhotoId>,
    /// Resulting number of photos of the product.
    pub photo_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub cleanup_failed: usize,
    pub photo_count: usize,
    pub profile_photo: Option<PhotoId>,
}

impl PhotoBatchReport {
    pub fn succeeded(&self) -> usize {
        self.attached.len() + self.removed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            succeeded: self.succeeded(),
            failed: self.failed.len(),
            cleanup_failed: self.cleanup_failures.len(),
            photo_count: self.photo_count,
            profile_photo: self.profile_photo,
        }
    }

    fn record(&mut self, dispatched: &Dispatched) {
        for event in &dispatched.events {
            match event {
                PhotoEvent::PhotoAttached(e) => {
                    self.attached.push(e.photo_id);
                    if e.profile {
                        self.profile_assigned = Some(e.photo_id);
                    }
                }
                PhotoEvent::PhotoRemoved(e) => self.removed.push(e.photo_id),
                PhotoEvent::ProfileAssigned(e) => self.profile_assigned = Some(e.photo_id),
            }
        }
        self.observe(&dispatched.photos);
    }

    fn observe(&mut self, photos: &ProductPhotos) {
        self.profile_photo = photos.profile_photo().map(Photo::id_typed);
        self.photo_count = photos.len();
    }
}

/// Uploads that made it into storage, ready for a command.
struct StagedUploads {
    incoming: Vec<IncomingPhoto>,
    failed: Vec<ItemFailure>,
}

pub struct PhotoManager<S, I> {
    dispatcher: PhotoDispatcher<S>,
    storage: I,
    max_image_bytes: usize,
}

impl<S, I> PhotoManager<S, I> {
    pub fn new(store: S, storage: I) -> Self {
        Self {
            dispatcher: PhotoDispatcher::new(store),
            storage,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }
}

impl<S, I> PhotoManager<S, I>
where
    S: PhotoStore,
    I: ImageStorage,
{
    pub fn photos(&self, product_id: ProductId) -> Result<ProductPhotos, PhotoError> {
        self.dispatcher.load(product_id)
    }

    /// Store and attach new photos.
    ///
    /// The first upload asking for the profile wins unless the product
    /// already has one; with no profile at the end the earliest photo is
    /// promoted. In best-effort mode, uploads that fail validation or storage
    /// are reported and skipped; the rest are committed.
    pub fn attach_photos(
        &self,
        product_id: ProductId,
        uploads: Vec<PhotoUpload>,
        mode: BatchMode,
    ) -> Result<PhotoBatchReport, PhotoError> {
        let staged = self.stage_uploads(&uploads);
        self.abort_if_needed(mode, &staged, &[])?;

        let command = PhotoCommand::AttachPhotos(AttachPhotos {
            product_id,
            photos: staged.incoming.clone(),
            occurred_at: Utc::now(),
        });
        let dispatched = self.dispatch_staged(command, &staged)?;

        let mut report = PhotoBatchReport {
            failed: staged.failed,
            ..PhotoBatchReport::default()
        };
        report.record(&dispatched);

        info!(
            product_id = %product_id,
            attached = report.attached.len(),
            failed = report.failed.len(),
            profile_photo = ?report.profile_photo,
            "photos attached"
        );
        Ok(report)
    }

    /// Delete photos of a product and their stored files.
    ///
    /// Ids the product does not own are reported as `NotFound` and never
    /// touch another product's photos.
    pub fn delete_photos(
        &self,
        product_id: ProductId,
        photo_ids: &[PhotoId],
        mode: BatchMode,
    ) -> Result<PhotoBatchReport, PhotoError> {
        let current = self.dispatcher.load(product_id)?;
        let (owned, foreign) = partition_owned(&current, photo_ids);
        if mode == BatchMode::AllOrNothing && !foreign.is_empty() {
            return Err(PhotoError::BatchAborted(foreign));
        }

        let dispatched = self.dispatcher.dispatch(PhotoCommand::DeletePhotos(DeletePhotos {
            product_id,
            photo_ids: owned,
            occurred_at: Utc::now(),
        }))?;

        let mut report = PhotoBatchReport {
            failed: foreign,
            ..PhotoBatchReport::default()
        };
        report.record(&dispatched);
        report.cleanup_failures = self.remove_stored_files(&dispatched.events);

        info!(
            product_id = %product_id,
            removed = report.removed.len(),
            failed = report.failed.len(),
            profile_photo = ?report.profile_photo,
            "photos deleted"
        );
        Ok(report)
    }

    /// Make `photo_id` the only profile photo of the product.
    pub fn reassign_profile(
        &self,
        product_id: ProductId,
        photo_id: PhotoId,
    ) -> Result<PhotoBatchReport, PhotoError> {
        let dispatched = self
            .dispatcher
            .dispatch(PhotoCommand::ReassignProfile(ReassignProfile {
                product_id,
                photo_id,
                occurred_at: Utc::now(),
            }))?;

        let mut report = PhotoBatchReport::default();
        report.record(&dispatched);
        debug!(product_id = %product_id, photo_id = %photo_id, "profile photo reassigned");
        Ok(report)
    }

    /// Apply an edit form's photo changes: deletions, then reassignment, then
    /// uploads, then one fallback pass.
    pub fn update_photos(
        &self,
        product_id: ProductId,
        changes: PhotoChanges,
        mode: BatchMode,
    ) -> Result<PhotoBatchReport, PhotoError> {
        let current = self.dispatcher.load(product_id)?;
        let (delete_ids, mut rejected) = partition_owned(&current, &changes.delete_ids);

        let reassign_to = match changes.reassign_to {
            Some(id) if current.contains(id) && !delete_ids.contains(&id) => Some(id),
            Some(id) => {
                rejected.push(ItemFailure::new(
                    BatchItem::Photo(id),
                    PhotoError::NotFound(format!(
                        "photo {id} is not an existing photo of product {product_id}"
                    )),
                ));
                None
            }
            None => None,
        };

        if mode == BatchMode::AllOrNothing && !rejected.is_empty() {
            return Err(PhotoError::BatchAborted(rejected));
        }

        let staged = self.stage_uploads(&changes.new_photos);
        self.abort_if_needed(mode, &staged, &rejected)?;

        let command = PhotoCommand::CompositeUpdate(CompositeUpdate {
            product_id,
            delete_ids,
            reassign_to,
            new_photos: staged.incoming.clone(),
            occurred_at: Utc::now(),
        });
        let dispatched = self.dispatch_staged(command, &staged)?;

        rejected.extend(staged.failed);
        let mut report = PhotoBatchReport {
            failed: rejected,
            ..PhotoBatchReport::default()
        };
        report.record(&dispatched);
        report.cleanup_failures = self.remove_stored_files(&dispatched.events);

        info!(
            product_id = %product_id,
            attached = report.attached.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            profile_photo = ?report.profile_photo,
            "product photos updated"
        );
        Ok(report)
    }

    /// Drop every photo of a product (product deletion).
    pub fn remove_all(&self, product_id: ProductId) -> Result<PhotoBatchReport, PhotoError> {
        let current = self.dispatcher.load(product_id)?;
        self.dispatcher.store().remove_stream(product_id)?;

        let mut report = PhotoBatchReport::default();
        for photo in current.photos() {
            report.removed.push(photo.id_typed());
            if let Err(e) = self.storage.delete(photo.url_photo()) {
                warn!(
                    product_id = %product_id,
                    photo_id = %photo.id_typed(),
                    reference = photo.url_photo(),
                    error = %e,
                    "failed to delete stored image"
                );
                report
                    .cleanup_failures
                    .push(ItemFailure::new(BatchItem::Photo(photo.id_typed()), e));
            }
        }

        info!(product_id = %product_id, removed = report.removed.len(), "all product photos removed");
        Ok(report)
    }

    fn stage_uploads(&self, uploads: &[PhotoUpload]) -> StagedUploads {
        let mut staged = StagedUploads {
            incoming: Vec::with_capacity(uploads.len()),
            failed: Vec::new(),
        };

        for (idx, upload) in uploads.iter().enumerate() {
            let format = match upload.image.validate(self.max_image_bytes) {
                Ok(format) => format,
                Err(e) => {
                    debug!(index = idx, error = %e, "rejected upload");
                    staged.failed.push(ItemFailure::new(BatchItem::Upload(idx), e));
                    continue;
                }
            };

            match self.storage.store(&upload.image, format) {
                Ok(reference) => staged.incoming.push(IncomingPhoto {
                    photo_id: self.dispatcher.store().next_photo_id(),
                    url_photo: reference,
                    requested_profile: upload.requested_profile,
                }),
                Err(e) => {
                    warn!(index = idx, file_name = %upload.image.file_name, error = %e, "failed to store image");
                    staged.failed.push(ItemFailure::new(BatchItem::Upload(idx), e));
                }
            }
        }

        staged
    }

    fn abort_if_needed(
        &self,
        mode: BatchMode,
        staged: &StagedUploads,
        rejected: &[ItemFailure],
    ) -> Result<(), PhotoError> {
        if mode == BatchMode::BestEffort || (staged.failed.is_empty() && rejected.is_empty()) {
            return Ok(());
        }
        self.discard_staged(staged);
        let mut failures = rejected.to_vec();
        failures.extend(staged.failed.iter().cloned());
        Err(PhotoError::BatchAborted(failures))
    }

    fn dispatch_staged(
        &self,
        command: PhotoCommand,
        staged: &StagedUploads,
    ) -> Result<Dispatched, PhotoError> {
        self.dispatcher.dispatch(command).inspect_err(|e| {
            warn!(error = %e, "photo command rejected; discarding stored uploads");
            self.discard_staged(staged);
        })
    }

    fn discard_staged(&self, staged: &StagedUploads) {
        for photo in &staged.incoming {
            if let Err(e) = self.storage.delete(&photo.url_photo) {
                warn!(reference = %photo.url_photo, error = %e, "failed to discard stored upload");
            }
        }
    }

    fn remove_stored_files(&self, events: &[PhotoEvent]) -> Vec<ItemFailure> {
        let mut failures = Vec::new();
        for event in events {
            let PhotoEvent::PhotoRemoved(removed) = event else {
                continue;
            };
            if let Err(e) = self.storage.delete(&removed.url_photo) {
                warn!(
                    product_id = %removed.product_id,
                    photo_id = %removed.photo_id,
                    reference = %removed.url_photo,
                    error = %e,
                    "failed to delete stored image; photo record removed anyway"
                );
                failures.push(ItemFailure::new(BatchItem::Photo(removed.photo_id), e));
            }
        }
        failures
    }
}

/// Split requested ids into owned ones and `NotFound` failures.
fn partition_owned(
    photos: &ProductPhotos,
    photo_ids: &[PhotoId],
) -> (Vec<PhotoId>, Vec<ItemFailure>) {
    let mut owned = Vec::new();
    let mut foreign = Vec::new();
    for &id in photo_ids {
        if photos.contains(id) {
            owned.push(id);
        } else {
            foreign.push(ItemFailure::new(
                BatchItem::Photo(id),
                PhotoError::NotFound(format!(
                    "photo {id} does not belong to product {}",
                    photos.product_id()
                )),
            ));
        }
    }
    (owned, foreign)
}
