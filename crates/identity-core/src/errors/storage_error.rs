/// Storage-layer errors raised by contact store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    /// The store refused the write because another writer holds the lock.
    /// Safe to retry the whole unit of work.
    #[error("store busy: {message}")]
    Busy { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("store backend failure: {message}")]
    Backend { message: String },

    /// `last_error` is the busy error from the final attempt.
    #[error("gave up after {attempts} attempts on a busy store: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl StorageError {
    /// Whether retrying the enclosing transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}
