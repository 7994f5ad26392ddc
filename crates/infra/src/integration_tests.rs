//! End-to-end tests for the photo pipeline.
//!
//! Tests: CatalogService → PhotoManager → PhotoDispatcher → PhotoStore (+ ImageStorage)
//!
//! Verifies:
//! - The profile invariant holds after every product/photo operation
//! - Photo operations never leak across products
//! - Optimistic concurrency conflicts are detected
//! - Files on a real disk follow the records

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    use chrono::Utc;

    use catalog_core::{Aggregate, AggregateRoot, ExpectedVersion, PhotoId, ProductId};
    use catalog_products::{
        ImageUpload, PhotoCommand, Price, ProductDraft, ReassignProfile, profile,
    };

    use crate::catalog_service::CatalogService;
    use crate::catalog_store::InMemoryCatalogStore;
    use crate::config::Config;
    use crate::error::{CatalogError, PhotoError};
    use crate::listing::ProductQuery;
    use crate::photo_manager::{BatchMode, PhotoChanges, PhotoManager, PhotoUpload};
    use crate::photo_store::{InMemoryPhotoStore, PhotoStore, UncommittedPhotoEvent};
    use crate::storage::InMemoryImageStorage;

    type Service =
        CatalogService<InMemoryCatalogStore, Arc<InMemoryPhotoStore>, Arc<InMemoryImageStorage>>;

    const GIF: [u8; 6] = *b"GIF89a";

    struct Harness {
        service: Service,
        store: Arc<InMemoryPhotoStore>,
        storage: Arc<InMemoryImageStorage>,
    }

    fn setup() -> Harness {
        catalog_observability::init();
        let store = Arc::new(InMemoryPhotoStore::new());
        let storage = Arc::new(InMemoryImageStorage::default());
        let photos = PhotoManager::new(store.clone(), storage.clone());
        let service = CatalogService::new(InMemoryCatalogStore::new(), photos);
        service.seed_default_families().unwrap();
        Harness {
            service,
            store,
            storage,
        }
    }

    fn gif(name: &str) -> PhotoUpload {
        PhotoUpload::new(ImageUpload::new(name, GIF.to_vec()).with_content_type("image/gif"))
    }

    fn product(h: &Harness, name: &str, uploads: Vec<PhotoUpload>) -> (ProductId, Vec<PhotoId>) {
        let created = h
            .service
            .create_product(
                ProductDraft {
                    name: name.to_string(),
                    price: Price::from_cents(250),
                    ..ProductDraft::default()
                },
                uploads,
                BatchMode::BestEffort,
            )
            .unwrap();
        (created.product.id_typed(), created.photos.attached)
    }

    fn assert_invariant(h: &Harness, product_id: ProductId) {
        let photos = h.service.photo_manager().photos(product_id).unwrap();
        profile::check_invariant(photos.photos()).unwrap();
    }

    fn profile_of(h: &Harness, product_id: ProductId) -> Option<PhotoId> {
        h.service
            .photo_manager()
            .photos(product_id)
            .unwrap()
            .profile_photo()
            .map(|p| p.id_typed())
    }

    #[test]
    fn delete_profile_promotes_next_and_leaves_others() {
        let h = setup();
        let (id, photos) = product(&h, "Leche", vec![gif("1"), gif("2"), gif("3")]);
        assert_eq!(profile_of(&h, id), Some(photos[0]));

        h.service
            .photo_manager()
            .delete_photos(id, &[photos[0]], BatchMode::BestEffort)
            .unwrap();

        let current = h.service.photo_manager().photos(id).unwrap();
        assert_eq!(profile_of(&h, id), Some(photos[1]));
        assert!(!current.photo(photos[2]).unwrap().is_profile());
        assert_invariant(&h, id);
    }

    #[test]
    fn cross_product_operations_change_nothing() {
        let h = setup();
        let (a, a_photos) = product(&h, "Leche", vec![gif("a1"), gif("a2")]);
        let (b, b_photos) = product(&h, "Jugo", vec![gif("b1")]);
        let before_a = h.service.photo_manager().photos(a).unwrap();
        let before_b = h.service.photo_manager().photos(b).unwrap();

        let err = h.service.reassign_profile_photo(a, b_photos[0]).unwrap_err();
        assert!(matches!(err, CatalogError::Photo(PhotoError::NotFound(_))));

        let err = h
            .service
            .photo_manager()
            .delete_photos(b, &[a_photos[1]], BatchMode::AllOrNothing)
            .unwrap_err();
        assert!(matches!(err, PhotoError::BatchAborted(_)));

        assert_eq!(h.service.photo_manager().photos(a).unwrap(), before_a);
        assert_eq!(h.service.photo_manager().photos(b).unwrap(), before_b);
    }

    #[test]
    fn storage_failure_creates_no_record() {
        let h = setup();
        h.storage.fail_store_for("broken");
        let (id, attached) = product(&h, "Leche", vec![gif("broken"), gif("ok")]);

        assert_eq!(attached.len(), 1);
        let photos = h.service.photo_manager().photos(id).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(profile_of(&h, id), Some(attached[0]));
        assert_eq!(h.storage.len(), 1);
    }

    #[test]
    fn edit_flow_keeps_single_profile() {
        let h = setup();
        let (id, photos) = product(&h, "Leche", vec![gif("1"), gif("2").as_profile()]);
        assert_eq!(profile_of(&h, id), Some(photos[1]));

        let change = h
            .service
            .edit_product(
                id,
                ProductDraft {
                    code: Some("P001".to_string()),
                    name: "Leche entera".to_string(),
                    price: Price::from_cents(300),
                    ..ProductDraft::default()
                },
                PhotoChanges {
                    new_photos: vec![gif("3").as_profile(), gif("4").as_profile()],
                    delete_ids: vec![photos[1]],
                    reassign_to: None,
                },
                BatchMode::BestEffort,
            )
            .unwrap();

        // Deleting the profile leaves no profile before the uploads, so the
        // first requested upload takes it.
        assert_eq!(change.photos.profile_photo, Some(change.photos.attached[0]));
        assert_eq!(change.photos.photo_count, 3);
        assert_invariant(&h, id);
    }

    #[test]
    fn product_deletion_cascades() {
        let h = setup();
        let (id, _) = product(&h, "Leche", vec![gif("1"), gif("2")]);
        let (other, _) = product(&h, "Jugo", vec![gif("3")]);

        h.service.delete_product(id).unwrap();

        assert!(h.store.load_stream(id).unwrap().is_empty());
        assert_eq!(h.storage.len(), 1);
        assert_eq!(h.service.photo_manager().photos(other).unwrap().len(), 1);
        let page = h.service.list_products(&ProductQuery::page(1)).unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn stale_append_is_a_conflict() {
        let h = setup();
        let (id, photos) = product(&h, "Leche", vec![gif("1"), gif("2")]);
        let stale = h.service.photo_manager().photos(id).unwrap();

        h.service.reassign_profile_photo(id, photos[1]).unwrap();

        // Decide on the stale state, then try to commit it.
        let events = stale
            .handle(&PhotoCommand::ReassignProfile(ReassignProfile {
                product_id: id,
                photo_id: photos[1],
                occurred_at: Utc::now(),
            }))
            .unwrap();
        let uncommitted = events
            .iter()
            .map(|e| UncommittedPhotoEvent::from_typed(id, e))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let err = h
            .store
            .append(id, uncommitted, ExpectedVersion::Exact(stale.version()))
            .unwrap_err();
        assert!(matches!(PhotoError::from(err), PhotoError::Conflict(_)));
        assert_eq!(profile_of(&h, id), Some(photos[1]));
        assert_invariant(&h, id);
    }

    #[test]
    fn concurrent_uploads_keep_one_profile() {
        let h = Arc::new(setup());
        let (id, _) = product(&h, "Leche", vec![]);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let h = h.clone();
                thread::spawn(move || {
                    let upload = vec![gif(&format!("t{i}")).as_profile()];
                    loop {
                        match h.service.photo_manager().attach_photos(
                            id,
                            upload.clone(),
                            BatchMode::AllOrNothing,
                        ) {
                            Ok(report) => return report,
                            Err(PhotoError::Conflict(_)) => continue,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let photos = h.service.photo_manager().photos(id).unwrap();
        assert_eq!(photos.len(), 8);
        assert_invariant(&h, id);
    }

    #[test]
    fn local_disk_catalog_follows_records() {
        catalog_observability::init();
        let root: PathBuf = std::env::temp_dir().join(format!("catalog-it-{}", uuid::Uuid::now_v7()));
        let config = Config::from_lookup(|key| match key {
            "CATALOG_STORAGE_ROOT" => Some(root.display().to_string()),
            _ => None,
        })
        .unwrap();
        let catalog = crate::local_catalog(&config);

        let created = catalog
            .create_product(
                ProductDraft {
                    name: "Papas".to_string(),
                    ..ProductDraft::default()
                },
                vec![gif("a"), gif("b")],
                BatchMode::AllOrNothing,
            )
            .unwrap();
        let id = created.product.id_typed();
        let details = catalog.product_details(id).unwrap();
        let profile_path = root.join(details.profile_photo.as_ref().unwrap().url_photo());
        assert!(profile_path.exists());

        catalog.delete_product(id).unwrap();
        assert!(!profile_path.exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
