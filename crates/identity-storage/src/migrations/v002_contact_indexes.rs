//! v002: lookup indexes for matching and cluster fetches.

use rusqlite::Connection;

use identity_core::errors::IdentityResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> IdentityResult<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email) WHERE deleted_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_contacts_phone ON contacts(phone_number) WHERE deleted_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_contacts_linked ON contacts(linked_id) WHERE deleted_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_contacts_created ON contacts(created_at, id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
