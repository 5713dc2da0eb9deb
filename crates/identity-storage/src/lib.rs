//! # identity-storage
//!
//! Contact store adapters: [`StorageEngine`] on SQLite (WAL, single writer,
//! read pool, versioned migrations) and [`MemoryStore`], an in-memory double
//! with fault injection for tests.

pub mod clock;
pub mod engine;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod transaction;

pub use engine::StorageEngine;
pub use memory::MemoryStore;

use identity_core::errors::{IdentityError, StorageError};

/// Wrap a message as a generic SQLite storage error.
pub(crate) fn to_storage_err(message: String) -> IdentityError {
    IdentityError::Storage(StorageError::Sqlite { message })
}

/// Map a rusqlite error, surfacing lock contention as retryable `Busy`.
pub(crate) fn from_sqlite(e: rusqlite::Error) -> IdentityError {
    use rusqlite::ErrorCode;
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            IdentityError::Storage(StorageError::Busy {
                message: e.to_string(),
            })
        }
        _ => to_storage_err(e.to_string()),
    }
}
