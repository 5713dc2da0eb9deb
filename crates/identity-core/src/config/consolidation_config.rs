use serde::{Deserialize, Serialize};

use super::defaults;

/// Consolidation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Total tries per call when the store reports busy. 1 disables retry.
    pub max_attempts: u32,
    /// Linear backoff step between attempts.
    pub retry_backoff_ms: u64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}
