//! Write transaction held on the single writer connection.

use std::collections::BTreeSet;
use std::sync::MutexGuard;

use rusqlite::Connection;
use tracing::warn;

use identity_core::contact::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use identity_core::errors::IdentityResult;
use identity_core::traits::{IContactStore, IStoreTransaction};

use crate::clock::MonotonicClock;
use crate::from_sqlite;
use crate::queries::{contact_crud, contact_query};

/// An open `BEGIN IMMEDIATE` transaction.
///
/// Holds the writer mutex for its whole life, so no other in-process writer
/// interleaves. Dropped without `commit` it rolls back.
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    clock: &'a MonotonicClock,
    finished: bool,
}

impl<'a> SqliteTransaction<'a> {
    pub(crate) fn begin(
        conn: MutexGuard<'a, Connection>,
        clock: &'a MonotonicClock,
    ) -> IdentityResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE").map_err(from_sqlite)?;
        Ok(Self {
            conn,
            clock,
            finished: false,
        })
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!(error = %e, "rollback failed");
            }
        }
    }
}

impl IContactStore for SqliteTransaction<'_> {
    fn find_matching(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<Vec<Contact>> {
        contact_query::find_matching(&self.conn, email, phone_number)
    }

    fn find_by_id(&self, id: &ContactId) -> IdentityResult<Option<Contact>> {
        contact_crud::get_contact(&self.conn, id)
    }

    fn find_by_ids(&self, ids: &BTreeSet<ContactId>) -> IdentityResult<Vec<Contact>> {
        contact_query::find_by_ids(&self.conn, ids)
    }

    fn find_cluster(&self, primary_id: &ContactId) -> IdentityResult<Vec<Contact>> {
        contact_query::find_cluster(&self.conn, primary_id)
    }

    fn create(&self, contact: NewContact) -> IdentityResult<Contact> {
        contact_crud::create_contact(&self.conn, contact, self.clock.now())
    }

    fn update(&self, id: &ContactId, patch: &ContactPatch) -> IdentityResult<()> {
        contact_crud::update_contact(&self.conn, id, patch, self.clock.now())
    }

    fn update_many(&self, filter: &ContactFilter, patch: &ContactPatch) -> IdentityResult<usize> {
        contact_crud::update_where(&self.conn, filter, patch, self.clock.now())
    }
}

impl IStoreTransaction for SqliteTransaction<'_> {
    fn commit(mut self: Box<Self>) -> IdentityResult<()> {
        // On failure `finished` stays false and Drop rolls back.
        self.conn.execute_batch("COMMIT").map_err(from_sqlite)?;
        self.finished = true;
        Ok(())
    }
}
