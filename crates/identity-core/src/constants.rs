/// Identity system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current schema version written by the SQLite migrations.
pub const SCHEMA_VERSION: u32 = 2;

/// Upper bound on consolidation attempts, whatever the config says.
pub const MAX_CONSOLIDATION_ATTEMPTS: u32 = 10;

/// Maximum number of ids bound into a single `IN (...)` query.
pub const MAX_IDS_PER_QUERY: usize = 500;
