use serde::{Deserialize, Serialize};

use super::defaults;

/// SQLite store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub db_path: String,
    /// Number of read-only connections (clamped to 1..=8).
    pub read_pool_size: usize,
    /// How long a writer waits on a locked database before reporting busy.
    pub busy_timeout_ms: u64,
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_PATH.to_string(),
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            wal_mode: defaults::DEFAULT_WAL_MODE,
        }
    }
}
