//! Subscriber initialization plus span and event helpers.

pub mod events;
pub mod spans;

use identity_core::config::ObservabilityConfig;
use identity_core::errors::{IdentityError, IdentityResult};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `log_level`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &ObservabilityConfig) -> IdentityResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| IdentityError::Config {
            reason: format!("log filter: {e}"),
        })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| IdentityError::Config {
        reason: format!("tracing init: {e}"),
    })
}
