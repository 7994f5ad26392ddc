use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use catalog_products::{ImageFormat, ImageUpload};

use super::r#trait::{ImageStorage, StorageError};

/// In-memory image storage.
///
/// Intended for tests/dev. Failures can be injected per file name (store) or
/// globally (delete).
#[derive(Debug)]
pub struct InMemoryImageStorage {
    directory: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    next: AtomicU64,
    failing_uploads: RwLock<HashSet<String>>,
    fail_deletes: AtomicBool,
}

impl Default for InMemoryImageStorage {
    fn default() -> Self {
        Self::new("products")
    }
}

impl InMemoryImageStorage {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            objects: RwLock::new(HashMap::new()),
            next: AtomicU64::new(1),
            failing_uploads: RwLock::new(HashSet::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Make every `store` of an upload with this file name fail.
    pub fn fail_store_for(&self, file_name: impl Into<String>) {
        if let Ok(mut failing) = self.failing_uploads.write() {
            failing.insert(file_name.into());
        }
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(reference))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageStorage for InMemoryImageStorage {
    fn store(&self, image: &ImageUpload, format: ImageFormat) -> Result<String, StorageError> {
        let rejected = self
            .failing_uploads
            .read()
            .map_err(|_| StorageError::Rejected("lock poisoned".to_string()))?
            .contains(&image.file_name);
        if rejected {
            return Err(StorageError::Rejected(format!(
                "refusing to store {}",
                image.file_name
            )));
        }

        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let reference = format!("{}/{n:06}.{}", self.directory, format.extension());
        self.objects
            .write()
            .map_err(|_| StorageError::Rejected("lock poisoned".to_string()))?
            .insert(reference.clone(), image.bytes.clone());
        Ok(reference)
    }

    fn delete(&self, reference: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(format!("refusing to delete {reference}")));
        }
        let removed = self
            .objects
            .write()
            .map_err(|_| StorageError::Rejected("lock poisoned".to_string()))?
            .remove(reference);
        match removed {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(reference.to_string())),
        }
    }
}
