use std::fs;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use catalog_products::{ImageFormat, ImageUpload};

use super::r#trait::{ImageStorage, StorageError};

/// Stores images as files under `<root>/<directory>/`.
///
/// References are relative to `root` (e.g. `products/<uuid>.png`), so a web
/// server can expose `root` as a public directory.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    directory: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, directory: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            directory: directory.into(),
        }
    }

    /// Resolve a reference inside `root`, refusing anything that escapes it.
    fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(reference);
        let safe = !reference.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::Rejected(format!("invalid reference: {reference}")));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageStorage for LocalDiskStorage {
    fn store(&self, image: &ImageUpload, format: ImageFormat) -> Result<String, StorageError> {
        let dir = self.root.join(&self.directory);
        fs::create_dir_all(&dir)?;

        let file_name = format!("{}.{}", Uuid::now_v7().simple(), format.extension());
        fs::write(dir.join(&file_name), &image.bytes)?;

        Ok(format!("{}/{}", self.directory, file_name))
    }

    fn delete(&self, reference: &str) -> Result<(), StorageError> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
