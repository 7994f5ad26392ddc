//! Runtime configuration from the environment (and an optional `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::debug;

use catalog_observability::LogConfig;
use catalog_products::image::DEFAULT_MAX_IMAGE_BYTES;

use crate::listing::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub log: LogConfig,
}

/// Where uploaded product photos go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root of the public disk.
    pub root: PathBuf,
    /// Directory under `root` holding product photos.
    pub photo_dir: String,
    pub max_photo_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub page_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage/app/public"),
            photo_dir: "products".to_string(),
            max_photo_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read `CATALOG_*` variables.
    ///
    /// A `.env` that exists but cannot be read or parsed is an error.
    pub fn from_env() -> Result<Self> {
        let loaded = dotenvy::dotenv().map(|path| debug!(path = %path.display(), "loaded .env"));
        env_file_loaded(loaded)?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (the environment, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let storage_defaults = StorageConfig::default();
        let log_defaults = LogConfig::default();

        let storage = StorageConfig {
            root: lookup("CATALOG_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(storage_defaults.root),
            photo_dir: lookup("CATALOG_PHOTO_DIR").unwrap_or(storage_defaults.photo_dir),
            max_photo_bytes: parse_var(
                &lookup,
                "CATALOG_MAX_PHOTO_BYTES",
                storage_defaults.max_photo_bytes,
            )?,
        };

        let page_size: usize = parse_var(&lookup, "CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            anyhow::bail!("CATALOG_PAGE_SIZE must be at least 1");
        }

        let log = LogConfig {
            filter: lookup("CATALOG_LOG_FILTER").unwrap_or(log_defaults.filter),
            json: parse_var(&lookup, "CATALOG_LOG_JSON", log_defaults.json)?,
        };

        Ok(Self {
            storage,
            catalog: CatalogConfig { page_size },
            log,
        })
    }
}

/// Only a missing file is tolerated.
fn env_file_loaded(result: Result<(), dotenvy::Error>) -> Result<()> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other.context("failed to load .env file"),
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
