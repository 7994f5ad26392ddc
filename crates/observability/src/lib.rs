//! Tracing/logging setup shared by every binary and test harness.

use serde::{Deserialize, Serialize};

/// Tracing configuration (filters, output format).
pub mod tracing;

/// Log output settings.
///
/// `RUST_LOG`, when set, takes precedence over `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub filter: String,
    /// JSON lines when true, human-readable text otherwise.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
        }
    }
}

/// Initialize process-wide tracing with the default configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&LogConfig::default());
}

/// Initialize process-wide tracing from an explicit configuration.
pub fn init_with(config: &LogConfig) {
    tracing::init(config);
}
