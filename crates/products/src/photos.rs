//! Photo collection of one product (event-sourced aggregate).
//!
//! Every command leaves the collection with exactly `min(1, len)` profile
//! photos. See [`crate::profile`] for the rules themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Event, PhotoId, ProductId,
};

use crate::photo::{Photo, URL_PHOTO_MAX};
use crate::profile;

/// Aggregate root: the photos owned by one product, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPhotos {
    product_id: ProductId,
    photos: Vec<Photo>,
    version: u64,
}

impl ProductPhotos {
    /// Empty collection for a product (also the rehydration starting point).
    pub fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            photos: Vec::new(),
            version: 0,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photo(&self, photo_id: PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id_typed() == photo_id)
    }

    pub fn contains(&self, photo_id: PhotoId) -> bool {
        self.photo(photo_id).is_some()
    }

    pub fn profile_photo(&self) -> Option<&Photo> {
        profile::current_profile(&self.photos).and_then(|id| self.photo(id))
    }

    pub fn check_invariant(&self) -> DomainResult<()> {
        profile::check_invariant(&self.photos)
    }
}

impl AggregateRoot for ProductPhotos {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// One upload in a batch. The id is allocated by the caller, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingPhoto {
    pub photo_id: PhotoId,
    pub url_photo: String,
    pub requested_profile: bool,
}

/// Command: AttachPhotos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachPhotos {
    pub product_id: ProductId,
    pub photos: Vec<IncomingPhoto>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeletePhotos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePhotos {
    pub product_id: ProductId,
    pub photo_ids: Vec<PhotoId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReassignProfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignProfile {
    pub product_id: ProductId,
    pub photo_id: PhotoId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompositeUpdate (the product edit form).
///
/// Applied as: deletions, reassignment, uploads, then one fallback pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeUpdate {
    pub product_id: ProductId,
    pub delete_ids: Vec<PhotoId>,
    pub reassign_to: Option<PhotoId>,
    pub new_photos: Vec<IncomingPhoto>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoCommand {
    AttachPhotos(AttachPhotos),
    DeletePhotos(DeletePhotos),
    ReassignProfile(ReassignProfile),
    CompositeUpdate(CompositeUpdate),
}

impl PhotoCommand {
    pub fn product_id(&self) -> ProductId {
        match self {
            PhotoCommand::AttachPhotos(c) => c.product_id,
            PhotoCommand::DeletePhotos(c) => c.product_id,
            PhotoCommand::ReassignProfile(c) => c.product_id,
            PhotoCommand::CompositeUpdate(c) => c.product_id,
        }
    }
}

/// Event: PhotoAttached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttached {
    pub product_id: ProductId,
    pub photo_id: PhotoId,
    pub url_photo: String,
    pub profile: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PhotoRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRemoved {
    pub product_id: ProductId,
    pub photo_id: PhotoId,
    pub url_photo: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProfileAssigned. Clears every other profile flag in the same step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAssigned {
    pub product_id: ProductId,
    pub photo_id: PhotoId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoEvent {
    PhotoAttached(PhotoAttached),
    PhotoRemoved(PhotoRemoved),
    ProfileAssigned(ProfileAssigned),
}

impl PhotoEvent {
    pub fn photo_id(&self) -> PhotoId {
        match self {
            PhotoEvent::PhotoAttached(e) => e.photo_id,
            PhotoEvent::PhotoRemoved(e) => e.photo_id,
            PhotoEvent::ProfileAssigned(e) => e.photo_id,
        }
    }
}

impl Event for PhotoEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PhotoEvent::PhotoAttached(_) => "products.photo.attached",
            PhotoEvent::PhotoRemoved(_) => "products.photo.removed",
            PhotoEvent::ProfileAssigned(_) => "products.photo.profile_assigned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PhotoEvent::PhotoAttached(e) => e.occurred_at,
            PhotoEvent::PhotoRemoved(e) => e.occurred_at,
            PhotoEvent::ProfileAssigned(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ProductPhotos {
    type Command = PhotoCommand;
    type Event = PhotoEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PhotoEvent::PhotoAttached(e) => {
                if e.profile {
                    self.photos.iter_mut().for_each(|p| p.set_profile(false));
                }
                let photo = Photo::new(
                    e.photo_id,
                    e.product_id,
                    e.url_photo.clone(),
                    e.profile,
                    e.occurred_at,
                );
                let at = self.photos.partition_point(|p| p.id_typed() < e.photo_id);
                self.photos.insert(at, photo);
            }
            PhotoEvent::PhotoRemoved(e) => {
                self.photos.retain(|p| p.id_typed() != e.photo_id);
            }
            PhotoEvent::ProfileAssigned(e) => {
                for photo in &mut self.photos {
                    let is_target = photo.id_typed() == e.photo_id;
                    photo.set_profile(is_target);
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_product_id(command.product_id())?;

        // Decisions are made against a scratch copy that evolves as events are
        // emitted, so later steps see the effect of earlier ones.
        let mut scratch = self.clone();
        let mut events = Vec::new();

        match command {
            PhotoCommand::AttachPhotos(cmd) => {
                scratch.plan_attach(&cmd.photos, cmd.occurred_at, &mut events)?;
                scratch.plan_fallback(cmd.occurred_at, &mut events);
            }
            PhotoCommand::DeletePhotos(cmd) => {
                scratch.plan_delete(&cmd.photo_ids, cmd.occurred_at, &mut events)?;
                scratch.plan_fallback(cmd.occurred_at, &mut events);
            }
            PhotoCommand::ReassignProfile(cmd) => {
                scratch.plan_reassign(cmd.photo_id, cmd.occurred_at, &mut events)?;
                scratch.plan_fallback(cmd.occurred_at, &mut events);
            }
            PhotoCommand::CompositeUpdate(cmd) => {
                scratch.plan_delete(&cmd.delete_ids, cmd.occurred_at, &mut events)?;
                if let Some(target) = cmd.reassign_to {
                    scratch.plan_reassign(target, cmd.occurred_at, &mut events)?;
                }
                scratch.plan_attach(&cmd.new_photos, cmd.occurred_at, &mut events)?;
                scratch.plan_fallback(cmd.occurred_at, &mut events);
            }
        }

        scratch.check_invariant()?;
        Ok(events)
    }
}

impl ProductPhotos {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.product_id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn not_owned(&self, photo_id: PhotoId) -> DomainError {
        DomainError::not_found(format!(
            "photo {photo_id} does not belong to product {}",
            self.product_id
        ))
    }

    fn emit(&mut self, events: &mut Vec<PhotoEvent>, event: PhotoEvent) {
        self.apply(&event);
        events.push(event);
    }

    fn plan_attach(
        &mut self,
        incoming: &[IncomingPhoto],
        occurred_at: DateTime<Utc>,
        events: &mut Vec<PhotoEvent>,
    ) -> DomainResult<()> {
        for (idx, photo) in incoming.iter().enumerate() {
            if photo.url_photo.trim().is_empty() {
                return Err(DomainError::invalid_input(format!(
                    "photo {} (index {idx}) has an empty storage reference",
                    photo.photo_id
                )));
            }
            if photo.url_photo.chars().count() > URL_PHOTO_MAX {
                return Err(DomainError::invalid_input(format!(
                    "photo {} (index {idx}) storage reference exceeds {URL_PHOTO_MAX} characters",
                    photo.photo_id
                )));
            }
            let duplicate_in_batch = incoming[..idx]
                .iter()
                .any(|p| p.photo_id == photo.photo_id);
            if self.contains(photo.photo_id) || duplicate_in_batch {
                return Err(DomainError::conflict(format!(
                    "photo {} already exists",
                    photo.photo_id
                )));
            }
        }

        let requested: Vec<bool> = incoming.iter().map(|p| p.requested_profile).collect();
        let has_profile = profile::current_profile(&self.photos).is_some();
        let flags = profile::resolve_profile_flags(has_profile, &requested);

        for (photo, granted) in incoming.iter().zip(flags) {
            let event = PhotoEvent::PhotoAttached(PhotoAttached {
                product_id: self.product_id,
                photo_id: photo.photo_id,
                url_photo: photo.url_photo.clone(),
                profile: granted,
                occurred_at,
            });
            self.emit(events, event);
        }
        Ok(())
    }

    fn plan_delete(
        &mut self,
        photo_ids: &[PhotoId],
        occurred_at: DateTime<Utc>,
        events: &mut Vec<PhotoEvent>,
    ) -> DomainResult<()> {
        if let Some(foreign) = photo_ids.iter().find(|id| !self.contains(**id)) {
            return Err(self.not_owned(*foreign));
        }

        for &photo_id in photo_ids {
            // Repeated ids in the request collapse into one removal.
            let Some(photo) = self.photo(photo_id) else {
                continue;
            };
            let event = PhotoEvent::PhotoRemoved(PhotoRemoved {
                product_id: self.product_id,
                photo_id,
                url_photo: photo.url_photo().to_string(),
                occurred_at,
            });
            self.emit(events, event);
        }
        Ok(())
    }

    fn plan_reassign(
        &mut self,
        photo_id: PhotoId,
        occurred_at: DateTime<Utc>,
        events: &mut Vec<PhotoEvent>,
    ) -> DomainResult<()> {
        if !self.contains(photo_id) {
            return Err(self.not_owned(photo_id));
        }

        let already_sole_profile = profile::profile_count(&self.photos) == 1
            && profile::current_profile(&self.photos) == Some(photo_id);
        if already_sole_profile {
            return Ok(());
        }

        let event = PhotoEvent::ProfileAssigned(ProfileAssigned {
            product_id: self.product_id,
            photo_id,
            occurred_at,
        });
        self.emit(events, event);
        Ok(())
    }

    fn plan_fallback(&mut self, occurred_at: DateTime<Utc>, events: &mut Vec<PhotoEvent>) {
        // Repairs a set holding several profiles too (e.g. imported data).
        let candidate = if profile::profile_count(&self.photos) > 1 {
            profile::current_profile(&self.photos)
        } else {
            profile::fallback_candidate(&self.photos)
        };

        if let Some(photo_id) = candidate {
            let event = PhotoEvent::ProfileAssigned(ProfileAssigned {
                product_id: self.product_id,
                photo_id,
                occurred_at,
            });
            self.emit(events, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductId {
        ProductId::new(1)
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn incoming(id: u64, requested_profile: bool) -> IncomingPhoto {
        IncomingPhoto {
            photo_id: PhotoId::new(id),
            url_photo: format!("products/{id}.jpg"),
            requested_profile,
        }
    }

    fn attach(photos: Vec<IncomingPhoto>) -> PhotoCommand {
        PhotoCommand::AttachPhotos(AttachPhotos {
            product_id: product(),
            photos,
            occurred_at: now(),
        })
    }

    fn delete(ids: &[u64]) -> PhotoCommand {
        PhotoCommand::DeletePhotos(DeletePhotos {
            product_id: product(),
            photo_ids: ids.iter().copied().map(PhotoId::new).collect(),
            occurred_at: now(),
        })
    }

    fn reassign(id: u64) -> PhotoCommand {
        PhotoCommand::ReassignProfile(ReassignProfile {
            product_id: product(),
            photo_id: PhotoId::new(id),
            occurred_at: now(),
        })
    }

    fn execute(photos: &mut ProductPhotos, command: PhotoCommand) -> Vec<PhotoEvent> {
        let events = photos.handle(&command).unwrap();
        for event in &events {
            photos.apply(event);
        }
        events
    }

    fn profile_ids(photos: &ProductPhotos) -> Vec<u64> {
        photos
            .photos()
            .iter()
            .filter(|p| p.is_profile())
            .map(|p| p.id_typed().value())
            .collect()
    }

    /// Photos 1, 2, 3 with 1 as profile.
    fn three_photos() -> ProductPhotos {
        let mut photos = ProductPhotos::empty(product());
        execute(
            &mut photos,
            attach(vec![incoming(1, true), incoming(2, false), incoming(3, false)]),
        );
        photos
    }

    #[test]
    fn first_requested_profile_in_batch_wins() {
        let mut photos = ProductPhotos::empty(product());
        execute(&mut photos, attach(vec![incoming(1, true), incoming(2, true)]));

        assert_eq!(profile_ids(&photos), vec![1]);
        assert!(!photos.photo(PhotoId::new(2)).unwrap().is_profile());
    }

    #[test]
    fn unflagged_batch_promotes_first_created() {
        let mut photos = ProductPhotos::empty(product());
        let events = execute(&mut photos, attach(vec![incoming(1, false), incoming(2, false)]));

        assert_eq!(profile_ids(&photos), vec![1]);
        assert!(matches!(
            events.last(),
            Some(PhotoEvent::ProfileAssigned(e)) if e.photo_id == PhotoId::new(1)
        ));
    }

    #[test]
    fn upload_does_not_displace_existing_profile() {
        let mut photos = three_photos();
        execute(&mut photos, attach(vec![incoming(4, true)]));

        assert_eq!(profile_ids(&photos), vec![1]);
        assert!(!photos.photo(PhotoId::new(4)).unwrap().is_profile());
    }

    #[test]
    fn deleting_profile_promotes_lowest_remaining() {
        let mut photos = three_photos();
        execute(&mut photos, delete(&[1]));

        assert!(!photos.contains(PhotoId::new(1)));
        assert_eq!(profile_ids(&photos), vec![2]);
        assert!(!photos.photo(PhotoId::new(3)).unwrap().is_profile());
    }

    #[test]
    fn deleting_every_photo_leaves_no_profile() {
        let mut photos = three_photos();
        execute(&mut photos, delete(&[3, 1, 2]));

        assert!(photos.is_empty());
        assert!(photos.check_invariant().is_ok());
    }

    #[test]
    fn duplicate_delete_ids_collapse() {
        let mut photos = three_photos();
        let events = execute(&mut photos, delete(&[2, 2]));

        assert_eq!(events.len(), 1);
        assert_eq!(photos.len(), 2);
    }

    #[test]
    fn delete_of_foreign_photo_is_not_found_and_changes_nothing() {
        let photos = three_photos();
        let before = photos.clone();
        let err = photos.handle(&delete(&[2, 99])).unwrap_err();

        assert!(matches!(err, DomainError::NotFound(msg) if msg.contains("99")));
        assert_eq!(photos, before);
    }

    #[test]
    fn reassign_moves_profile_atomically() {
        let mut photos = three_photos();
        let events = execute(&mut photos, reassign(3));

        assert_eq!(events.len(), 1);
        assert_eq!(profile_ids(&photos), vec![3]);
    }

    #[test]
    fn reassign_is_idempotent() {
        let mut photos = three_photos();
        execute(&mut photos, reassign(2));
        let once = photos.photos().to_vec();

        let events = execute(&mut photos, reassign(2));
        assert!(events.is_empty());
        assert_eq!(photos.photos(), once.as_slice());
    }

    #[test]
    fn reassign_to_photo_of_another_product_is_not_found() {
        let photos = three_photos();
        let err = photos.handle(&reassign(42)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn command_for_other_product_is_rejected() {
        let photos = three_photos();
        let cmd = PhotoCommand::ReassignProfile(ReassignProfile {
            product_id: ProductId::new(2),
            photo_id: PhotoId::new(1),
            occurred_at: now(),
        });
        assert!(matches!(
            photos.handle(&cmd),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn attach_rejects_empty_reference_and_existing_ids() {
        let photos = three_photos();

        let mut blank = incoming(4, false);
        blank.url_photo = "  ".to_string();
        assert!(matches!(
            photos.handle(&attach(vec![blank])),
            Err(DomainError::InvalidInput(_))
        ));

        assert!(matches!(
            photos.handle(&attach(vec![incoming(2, false)])),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            photos.handle(&attach(vec![incoming(5, false), incoming(5, false)])),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn composite_replaces_deleted_profile_with_requested_upload() {
        let mut photos = three_photos();
        let cmd = PhotoCommand::CompositeUpdate(CompositeUpdate {
            product_id: product(),
            delete_ids: vec![PhotoId::new(1)],
            reassign_to: None,
            new_photos: vec![incoming(4, false), incoming(5, true)],
            occurred_at: now(),
        });
        execute(&mut photos, cmd);

        assert_eq!(profile_ids(&photos), vec![5]);
        assert_eq!(photos.len(), 4);
    }

    #[test]
    fn composite_reassignment_beats_upload_flag() {
        let mut photos = three_photos();
        let cmd = PhotoCommand::CompositeUpdate(CompositeUpdate {
            product_id: product(),
            delete_ids: vec![],
            reassign_to: Some(PhotoId::new(3)),
            new_photos: vec![incoming(4, true)],
            occurred_at: now(),
        });
        execute(&mut photos, cmd);

        assert_eq!(profile_ids(&photos), vec![3]);
    }

    #[test]
    fn composite_without_profile_request_falls_back_once() {
        let mut photos = three_photos();
        let cmd = PhotoCommand::CompositeUpdate(CompositeUpdate {
            product_id: product(),
            delete_ids: vec![PhotoId::new(1), PhotoId::new(2)],
            reassign_to: None,
            new_photos: vec![incoming(4, false)],
            occurred_at: now(),
        });
        let events = execute(&mut photos, cmd);

        assert_eq!(profile_ids(&photos), vec![3]);
        let assignments = events
            .iter()
            .filter(|e| matches!(e, PhotoEvent::ProfileAssigned(_)))
            .count();
        assert_eq!(assignments, 1);
    }

    #[test]
    fn composite_reassign_to_deleted_photo_is_not_found() {
        let photos = three_photos();
        let cmd = PhotoCommand::CompositeUpdate(CompositeUpdate {
            product_id: product(),
            delete_ids: vec![PhotoId::new(2)],
            reassign_to: Some(PhotoId::new(2)),
            new_photos: vec![],
            occurred_at: now(),
        });
        assert!(matches!(photos.handle(&cmd), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn fallback_repairs_inconsistent_history() {
        let mut photos = ProductPhotos::empty(product());
        for (id, profile) in [(1, true), (2, false)] {
            photos.apply(&PhotoEvent::PhotoAttached(PhotoAttached {
                product_id: product(),
                photo_id: PhotoId::new(id),
                url_photo: format!("products/{id}.jpg"),
                profile,
                occurred_at: now(),
            }));
        }
        // Force a second profile flag, as legacy data might carry.
        photos.photos[1].set_profile(true);

        execute(&mut photos, attach(vec![]));
        assert_eq!(profile_ids(&photos), vec![1]);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let photos = three_photos();
        let before = photos.clone();

        let events1 = photos.handle(&delete(&[1])).unwrap();
        let events2 = photos.handle(&delete(&[1])).unwrap();

        assert_eq!(photos, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_per_event() {
        let mut photos = ProductPhotos::empty(product());
        assert_eq!(photos.version(), 0);
        let events = execute(&mut photos, attach(vec![incoming(1, false), incoming(2, false)]));
        // two attachments + one fallback assignment
        assert_eq!(events.len(), 3);
        assert_eq!(photos.version(), 3);
    }

    #[test]
    fn events_have_stable_types() {
        let mut photos = ProductPhotos::empty(product());
        let events = execute(&mut photos, attach(vec![incoming(1, false)]));
        let types: Vec<&str> = events.iter().map(Event::event_type).collect();
        assert_eq!(
            types,
            vec!["products.photo.attached", "products.photo.profile_assigned"]
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Attach(Vec<bool>),
            Delete(Vec<usize>),
            Reassign(usize),
            Composite {
                delete: Vec<usize>,
                reassign: Option<usize>,
                attach: Vec<bool>,
            },
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                prop::collection::vec(any::<bool>(), 0..5).prop_map(Op::Attach),
                prop::collection::vec(any::<usize>(), 0..4).prop_map(Op::Delete),
                any::<usize>().prop_map(Op::Reassign),
                (
                    prop::collection::vec(any::<usize>(), 0..3),
                    proptest::option::of(any::<usize>()),
                    prop::collection::vec(any::<bool>(), 0..4),
                )
                    .prop_map(|(delete, reassign, attach)| Op::Composite {
                        delete,
                        reassign,
                        attach,
                    }),
            ]
        }

        /// Map arbitrary indexes onto ids currently in the set.
        fn pick(photos: &ProductPhotos, idx: usize) -> Option<PhotoId> {
            if photos.is_empty() {
                None
            } else {
                Some(photos.photos()[idx % photos.len()].id_typed())
            }
        }

        fn build(photos: &ProductPhotos, op: &Op, next_id: &mut u64) -> Option<PhotoCommand> {
            let mut uploads = |flags: &[bool]| -> Vec<IncomingPhoto> {
                flags
                    .iter()
                    .map(|&f| {
                        *next_id += 1;
                        incoming(*next_id, f)
                    })
                    .collect()
            };
            match op {
                Op::Attach(flags) => Some(attach(uploads(flags))),
                Op::Delete(idxs) => {
                    let ids: Vec<u64> = idxs
                        .iter()
                        .filter_map(|i| pick(photos, *i))
                        .map(|id| id.value())
                        .collect();
                    Some(delete(&ids))
                }
                Op::Reassign(i) => pick(photos, *i).map(|id| reassign(id.value())),
                Op::Composite {
                    delete: idxs,
                    reassign: target,
                    attach: flags,
                } => {
                    let delete_ids: Vec<PhotoId> =
                        idxs.iter().filter_map(|i| pick(photos, *i)).collect();
                    let reassign_to = target
                        .and_then(|i| pick(photos, i))
                        .filter(|id| !delete_ids.contains(id));
                    Some(PhotoCommand::CompositeUpdate(CompositeUpdate {
                        product_id: product(),
                        delete_ids,
                        reassign_to,
                        new_photos: uploads(flags),
                        occurred_at: now(),
                    }))
                }
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: after every command, profile count == min(1, photo count).
            #[test]
            fn exactly_one_profile_after_every_command(
                ops in prop::collection::vec(op_strategy(), 1..20)
            ) {
                let mut photos = ProductPhotos::empty(product());
                let mut next_id = 0u64;

                for op in &ops {
                    let Some(cmd) = build(&photos, op, &mut next_id) else {
                        continue;
                    };
                    let events = photos.handle(&cmd).unwrap();
                    for event in &events {
                        photos.apply(event);
                    }
                    prop_assert_eq!(
                        profile::profile_count(photos.photos()),
                        photos.len().min(1)
                    );
                }
            }

            /// Property: reassigning twice equals reassigning once.
            #[test]
            fn reassign_twice_equals_once(
                flags in prop::collection::vec(any::<bool>(), 1..8),
                target in any::<usize>()
            ) {
                let mut photos = ProductPhotos::empty(product());
                let uploads: Vec<IncomingPhoto> = flags
                    .iter()
                    .enumerate()
                    .map(|(i, f)| incoming(i as u64 + 1, *f))
                    .collect();
                execute(&mut photos, attach(uploads));

                let id = pick(&photos, target).unwrap();
                execute(&mut photos, reassign(id.value()));
                let once = photos.photos().to_vec();
                execute(&mut photos, reassign(id.value()));

                prop_assert_eq!(photos.photos(), once.as_slice());
            }

            /// Property: the profile after an unflagged upload on an empty set
            /// is always the first photo of the batch.
            #[test]
            fn unflagged_batch_promotes_first(count in 1usize..10) {
                let mut photos = ProductPhotos::empty(product());
                let uploads: Vec<IncomingPhoto> =
                    (1..=count as u64).map(|id| incoming(id, false)).collect();
                execute(&mut photos, attach(uploads));

                prop_assert_eq!(
                    photos.profile_photo().map(Photo::id_typed),
                    Some(PhotoId::new(1))
                );
            }
        }
    }
}
