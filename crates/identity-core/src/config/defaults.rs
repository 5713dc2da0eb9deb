// Storage
pub const DEFAULT_DB_PATH: &str = "identity.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_WAL_MODE: bool = true;

// Consolidation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 10;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
