//! v001: contacts table.

use rusqlite::Connection;

use identity_core::errors::IdentityResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> IdentityResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS contacts (
            id              TEXT PRIMARY KEY,
            email           TEXT,
            phone_number    TEXT,
            linked_id       TEXT,
            link_precedence TEXT NOT NULL CHECK (link_precedence IN ('primary', 'secondary')),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            deleted_at      TEXT,
            CHECK ((link_precedence = 'primary') = (linked_id IS NULL))
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
