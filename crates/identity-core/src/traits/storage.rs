use std::collections::BTreeSet;

use crate::contact::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use crate::errors::IdentityResult;

/// Read/write contract every contact store honors.
///
/// Soft-deleted contacts never appear in any result and are never touched by
/// updates. Multi-record results are ordered by `(created_at, id)` ascending.
/// Timestamps are kept to microsecond precision.
pub trait IContactStore {
    // --- Query ---
    /// Contacts whose email equals `email` OR whose phone equals `phone_number`.
    /// An absent input contributes no filter; both absent yields nothing.
    fn find_matching(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> IdentityResult<Vec<Contact>>;
    fn find_by_id(&self, id: &ContactId) -> IdentityResult<Option<Contact>>;
    fn find_by_ids(&self, ids: &BTreeSet<ContactId>) -> IdentityResult<Vec<Contact>>;
    /// The primary plus every contact linked to it.
    fn find_cluster(&self, primary_id: &ContactId) -> IdentityResult<Vec<Contact>>;

    // --- Write ---
    fn create(&self, contact: NewContact) -> IdentityResult<Contact>;
    fn update(&self, id: &ContactId, patch: &ContactPatch) -> IdentityResult<()>;
    fn update_many(&self, filter: &ContactFilter, patch: &ContactPatch) -> IdentityResult<usize>;
}

/// A unit of work against a store. Dropping without `commit` rolls back.
pub trait IStoreTransaction: IContactStore {
    fn commit(self: Box<Self>) -> IdentityResult<()>;
}

/// A shareable store that can open isolated transactions.
pub trait ITransactionalStore: IContactStore + Send + Sync {
    /// Begin a transaction. Blocks until the store grants write isolation.
    fn begin(&self) -> IdentityResult<Box<dyn IStoreTransaction + '_>>;
}
