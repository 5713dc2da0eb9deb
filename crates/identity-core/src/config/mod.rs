//! Layered configuration. Every section defaults, so an empty TOML file is valid.

pub mod consolidation_config;
pub mod defaults;
pub mod observability_config;
pub mod storage_config;

use serde::{Deserialize, Serialize};

pub use consolidation_config::ConsolidationConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;

use crate::errors::{IdentityError, IdentityResult};

/// Root configuration for the identity system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub storage: StorageConfig,
    pub consolidation: ConsolidationConfig,
    pub observability: ObservabilityConfig,
}

impl IdentityConfig {
    /// Parse from a TOML string. Missing keys take their defaults.
    pub fn from_toml(input: &str) -> IdentityResult<Self> {
        toml::from_str(input).map_err(|e| IdentityError::Config {
            reason: e.to_string(),
        })
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &std::path::Path) -> IdentityResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| IdentityError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&raw)
    }
}
