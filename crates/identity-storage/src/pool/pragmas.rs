//! PRAGMA configuration applied to every SQLite connection.

use rusqlite::Connection;

use identity_core::config::StorageConfig;
use identity_core::errors::IdentityResult;

use crate::to_storage_err;

/// Apply write-connection pragmas: journal mode, sync level, busy timeout.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> IdentityResult<()> {
    let journal = if config.wal_mode { "WAL" } else { "DELETE" };
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {journal};
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -16000;
        PRAGMA foreign_keys = ON;
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    set_busy_timeout(conn, config.busy_timeout_ms)
}

/// Apply pragmas for read-only connections.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> IdentityResult<()> {
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(|e| to_storage_err(e.to_string()))?;
    set_busy_timeout(conn, busy_timeout_ms)
}

fn set_busy_timeout(conn: &Connection, busy_timeout_ms: u64) -> IdentityResult<()> {
    conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> IdentityResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
