//! The single serialized write connection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use identity_core::config::StorageConfig;
use identity_core::errors::IdentityResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// SQLite allows one writer at a time; this mutex makes that explicit
/// in-process, so concurrent transactions queue here instead of spinning on
/// `SQLITE_BUSY`.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, config: &StorageConfig) -> IdentityResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> IdentityResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the writer.
    pub fn with_conn_sync<F, T>(&self, f: F) -> IdentityResult<T>
    where
        F: FnOnce(&Connection) -> IdentityResult<T>,
    {
        let guard = self.lock()?;
        f(&guard)
    }

    /// Hold the writer for the lifetime of the guard (used by transactions).
    pub fn lock(&self) -> IdentityResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| to_storage_err(format!("writer lock poisoned: {e}")))
    }
}
