//! StorageEngine: owns the ConnectionPool, implements the contact store
//! traits, runs migrations on open.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::Connection;

use identity_core::config::StorageConfig;
use identity_core::contact::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use identity_core::errors::IdentityResult;
use identity_core::traits::{IContactStore, IStoreTransaction, ITransactionalStore};

use crate::clock::MonotonicClock;
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{contact_crud, contact_query};
use crate::transaction::SqliteTransaction;

/// SQLite-backed contact store.
///
/// Plain trait calls auto-commit one statement each. Multi-step work goes
/// through [`ITransactionalStore::begin`]. Do not call auto-commit writes from a
/// thread that holds an open transaction on the same engine: both need the
/// writer.
pub struct StorageEngine {
    pool: ConnectionPool,
    clock: MonotonicClock,
    /// When true, use the read pool for read operations (file-backed mode).
    /// When false, route all reads through the writer (in-memory mode,
    /// because in-memory read pool connections are isolated databases).
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk, with default settings.
    pub fn open(path: &Path) -> IdentityResult<Self> {
        Self::open_with_config(path, &StorageConfig::default())
    }

    /// Open the database file named by `config.db_path`.
    pub fn open_from_config(config: &StorageConfig) -> IdentityResult<Self> {
        Self::open_with_config(Path::new(&config.db_path), config)
    }

    pub fn open_with_config(path: &Path, config: &StorageConfig) -> IdentityResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        tracing::debug!(path = %path.display(), readers = pool.readers.size(), "opened contact store");
        let engine = Self {
            pool,
            clock: MonotonicClock::new(),
            use_read_pool: true,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> IdentityResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        let engine = Self {
            pool,
            clock: MonotonicClock::new(),
            use_read_pool: false,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> IdentityResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            let version = migrations::run_migrations(conn)?;
            tracing::debug!(version, "contact store ready");
            Ok(())
        })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Bulk-load pre-built contacts, ids and timestamps included.
    pub fn import(&self, contacts: &[Contact]) -> IdentityResult<usize> {
        self.pool
            .writer
            .with_conn_sync(|conn| contact_crud::import_contacts(conn, contacts))
    }

    /// Non-deleted contacts in the store.
    pub fn contact_count(&self) -> IdentityResult<usize> {
        self.with_reader(contact_query::count_contacts)
    }

    /// Non-deleted primaries in the store.
    pub fn primary_count(&self) -> IdentityResult<usize> {
        self.with_reader(contact_query::count_primaries)
    }

    /// Soft-delete a contact. It disappears from every query.
    pub fn soft_delete(&self, id: &ContactId) -> IdentityResult<()> {
        self.update(id, &ContactPatch::soft_delete())
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> IdentityResult<T>
    where
        F: FnOnce(&Connection) -> IdentityResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }
}

impl IContactStore for StorageEngine {
    fn find_matching(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<Vec<Contact>> {
        self.with_reader(|conn| contact_query::find_matching(conn, email, phone_number))
    }

    fn find_by_id(&self, id: &ContactId) -> IdentityResult<Option<Contact>> {
        self.with_reader(|conn| contact_crud::get_contact(conn, id))
    }

    fn find_by_ids(&self, ids: &BTreeSet<ContactId>) -> IdentityResult<Vec<Contact>> {
        self.with_reader(|conn| contact_query::find_by_ids(conn, ids))
    }

    fn find_cluster(&self, primary_id: &ContactId) -> IdentityResult<Vec<Contact>> {
        self.with_reader(|conn| contact_query::find_cluster(conn, primary_id))
    }

    fn create(&self, contact: NewContact) -> IdentityResult<Contact> {
        self.pool
            .writer
            .with_conn_sync(|conn| contact_crud::create_contact(conn, contact, self.clock.now()))
    }

    fn update(&self, id: &ContactId, patch: &ContactPatch) -> IdentityResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| contact_crud::update_contact(conn, id, patch, self.clock.now()))
    }

    fn update_many(&self, filter: &ContactFilter, patch: &ContactPatch) -> IdentityResult<usize> {
        self.pool
            .writer
            .with_conn_sync(|conn| contact_crud::update_where(conn, filter, patch, self.clock.now()))
    }
}

impl ITransactionalStore for StorageEngine {
    fn begin(&self) -> IdentityResult<Box<dyn IStoreTransaction + '_>> {
        let conn = self.pool.writer.lock()?;
        Ok(Box::new(SqliteTransaction::begin(conn, &self.clock)?))
    }
}
