//! Versioned schema migrations, tracked in `schema_version`.

mod v001_contacts;
mod v002_contact_indexes;

use rusqlite::Connection;
use tracing::info;

use identity_core::errors::{IdentityResult, StorageError};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> IdentityResult<()>;

const MIGRATIONS: &[(u32, &str, MigrationFn)] = &[
    (1, "contacts", v001_contacts::migrate),
    (2, "contact_indexes", v002_contact_indexes::migrate),
];

/// Highest migration version this build knows about.
pub const LATEST_VERSION: u32 = identity_core::constants::SCHEMA_VERSION;

/// Apply every migration newer than the recorded schema version.
/// Each migration commits together with its version row.
pub fn run_migrations(conn: &Connection) -> IdentityResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut current = current_version(conn)?;
    for &(version, name, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        apply(conn, version, migrate).map_err(|e| {
            identity_core::IdentityError::Storage(StorageError::MigrationFailed {
                version,
                reason: e.to_string(),
            })
        })?;
        info!(version, name, "applied migration");
        current = version;
    }
    Ok(current)
}

/// The highest applied migration, or 0 for a fresh database.
pub fn current_version(conn: &Connection) -> IdentityResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

fn apply(conn: &Connection, version: u32, migrate: MigrationFn) -> IdentityResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("migration begin: {e}")))?;
    migrate(&tx)?;
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("migration commit: {e}")))
}
