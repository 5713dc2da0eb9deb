//! In-memory contact store with fault injection, for tests and embedding.

mod state;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use identity_core::contact::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use identity_core::errors::{IdentityError, IdentityResult, StorageError};
use identity_core::traits::{IContactStore, IStoreTransaction, ITransactionalStore};

use crate::clock::{to_stored_precision, MonotonicClock};
use state::MemoryState;

/// Sentinel meaning "no fault armed".
const DISARMED: i64 = -1;

/// Mutex-guarded map of contacts.
///
/// Transactions hold the mutex, mutate a private copy, and swap it in on
/// commit, so an abandoned transaction leaves no trace.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    clock: MonotonicClock,
    writes: AtomicUsize,
    begins: AtomicUsize,
    /// Writes still allowed before every write fails. `DISARMED` when off.
    writes_before_failure: AtomicI64,
    /// `begin` calls that will report busy.
    busy_begins: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock: MonotonicClock::new(),
            writes: AtomicUsize::new(0),
            begins: AtomicUsize::new(0),
            writes_before_failure: AtomicI64::new(DISARMED),
            busy_begins: AtomicUsize::new(0),
        }
    }

    /// Load pre-built contacts, ids included. Timestamps are truncated to
    /// microseconds, matching what [`crate::StorageEngine`] reads back.
    pub fn import(&self, contacts: impl IntoIterator<Item = Contact>) -> IdentityResult<usize> {
        let mut state = self.lock()?;
        let mut n = 0;
        for mut contact in contacts {
            contact.created_at = to_stored_precision(contact.created_at);
            contact.updated_at = to_stored_precision(contact.updated_at);
            contact.deleted_at = contact.deleted_at.map(to_stored_precision);
            state.insert(contact);
            n += 1;
        }
        Ok(n)
    }

    /// Every contact, deleted ones included, oldest first.
    pub fn snapshot(&self) -> IdentityResult<Vec<Contact>> {
        Ok(self.lock()?.all())
    }

    /// Soft-delete a contact.
    pub fn soft_delete(&self, id: &ContactId) -> IdentityResult<()> {
        self.update(id, &ContactPatch::soft_delete())
    }

    /// Write operations attempted so far, transactional or not.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Transactions opened so far.
    pub fn begin_count(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    /// Let `n` more writes succeed, then fail every write with a backend error.
    pub fn fail_writes_after(&self, n: usize) {
        self.writes_before_failure.store(n as i64, Ordering::SeqCst);
    }

    /// Make the next `n` calls to `begin` report a busy store.
    pub fn fail_begins(&self, n: usize) {
        self.busy_begins.store(n, Ordering::SeqCst);
    }

    pub fn clear_faults(&self) {
        self.writes_before_failure.store(DISARMED, Ordering::SeqCst);
        self.busy_begins.store(0, Ordering::SeqCst);
    }

    fn lock(&self) -> IdentityResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|e| {
            IdentityError::Storage(StorageError::Backend {
                message: format!("memory store lock poisoned: {e}"),
            })
        })
    }

    /// Count the write and trip the armed fault, if any.
    fn check_write(&self) -> IdentityResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let remaining = self.writes_before_failure.load(Ordering::SeqCst);
        if remaining == DISARMED {
            return Ok(());
        }
        if remaining == 0 {
            return Err(IdentityError::Storage(StorageError::Backend {
                message: "injected write failure".to_string(),
            }));
        }
        self.writes_before_failure
            .store(remaining - 1, Ordering::SeqCst);
        Ok(())
    }

    fn check_begin(&self) -> IdentityResult<()> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        let armed = self
            .busy_begins
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if armed.is_ok() {
            return Err(IdentityError::Storage(StorageError::Busy {
                message: "injected conflict".to_string(),
            }));
        }
        Ok(())
    }
}

impl IContactStore for MemoryStore {
    fn find_matching(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<Vec<Contact>> {
        Ok(self.lock()?.find_matching(email, phone_number))
    }

    fn find_by_id(&self, id: &ContactId) -> IdentityResult<Option<Contact>> {
        Ok(self.lock()?.find_by_id(id))
    }

    fn find_by_ids(&self, ids: &BTreeSet<ContactId>) -> IdentityResult<Vec<Contact>> {
        Ok(self.lock()?.find_by_ids(ids))
    }

    fn find_cluster(&self, primary_id: &ContactId) -> IdentityResult<Vec<Contact>> {
        Ok(self.lock()?.find_cluster(primary_id))
    }

    fn create(&self, contact: NewContact) -> IdentityResult<Contact> {
        self.check_write()?;
        Ok(self.lock()?.create(contact, self.clock.now()))
    }

    fn update(&self, id: &ContactId, patch: &ContactPatch) -> IdentityResult<()> {
        self.check_write()?;
        self.lock()?.update(id, patch, self.clock.now())
    }

    fn update_many(&self, filter: &ContactFilter, patch: &ContactPatch) -> IdentityResult<usize> {
        self.check_write()?;
        Ok(self.lock()?.update_many(filter, patch, self.clock.now()))
    }
}

impl ITransactionalStore for MemoryStore {
    fn begin(&self) -> IdentityResult<Box<dyn IStoreTransaction + '_>> {
        self.check_begin()?;
        let guard = self.lock()?;
        let working = RefCell::new(guard.clone());
        Ok(Box::new(MemoryTransaction {
            store: self,
            guard,
            working,
        }))
    }
}

/// Exclusive transaction over a [`MemoryStore`].
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    guard: MutexGuard<'a, MemoryState>,
    working: RefCell<MemoryState>,
}

impl IContactStore for MemoryTransaction<'_> {
    fn find_matching(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<Vec<Contact>> {
        Ok(self.working.borrow().find_matching(email, phone_number))
    }

    fn find_by_id(&self, id: &ContactId) -> IdentityResult<Option<Contact>> {
        Ok(self.working.borrow().find_by_id(id))
    }

    fn find_by_ids(&self, ids: &BTreeSet<ContactId>) -> IdentityResult<Vec<Contact>> {
        Ok(self.working.borrow().find_by_ids(ids))
    }

    fn find_cluster(&self, primary_id: &ContactId) -> IdentityResult<Vec<Contact>> {
        Ok(self.working.borrow().find_cluster(primary_id))
    }

    fn create(&self, contact: NewContact) -> IdentityResult<Contact> {
        self.store.check_write()?;
        Ok(self
            .working
            .borrow_mut()
            .create(contact, self.store.clock.now()))
    }

    fn update(&self, id: &ContactId, patch: &ContactPatch) -> IdentityResult<()> {
        self.store.check_write()?;
        self.working
            .borrow_mut()
            .update(id, patch, self.store.clock.now())
    }

    fn update_many(&self, filter: &ContactFilter, patch: &ContactPatch) -> IdentityResult<usize> {
        self.store.check_write()?;
        Ok(self
            .working
            .borrow_mut()
            .update_many(filter, patch, self.store.clock.now()))
    }
}

impl IStoreTransaction for MemoryTransaction<'_> {
    fn commit(self: Box<Self>) -> IdentityResult<()> {
        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working.into_inner();
        Ok(())
    }
}
