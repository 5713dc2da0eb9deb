use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use identity_core::contact::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use identity_core::errors::{IdentityError, IdentityResult};

/// The contact table. Query semantics mirror the SQLite adapter.
#[derive(Debug, Clone, Default)]
pub(super) struct MemoryState {
    contacts: BTreeMap<ContactId, Contact>,
}

impl MemoryState {
    pub(super) fn insert(&mut self, contact: Contact) {
        self.contacts.insert(contact.id.clone(), contact);
    }

    pub(super) fn all(&self) -> Vec<Contact> {
        sorted(self.contacts.values())
    }

    pub(super) fn find_matching(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Vec<Contact> {
        sorted(self.live().filter(|c| {
            email.is_some_and(|e| c.has_email(e))
                || phone_number.is_some_and(|p| c.has_phone_number(p))
        }))
    }

    pub(super) fn find_by_id(&self, id: &ContactId) -> Option<Contact> {
        self.contacts.get(id).filter(|c| !c.is_deleted()).cloned()
    }

    pub(super) fn find_by_ids(&self, ids: &BTreeSet<ContactId>) -> Vec<Contact> {
        sorted(ids.iter().filter_map(|id| self.contacts.get(id)).filter(|c| !c.is_deleted()))
    }

    pub(super) fn find_cluster(&self, primary_id: &ContactId) -> Vec<Contact> {
        sorted(
            self.live()
                .filter(|c| &c.id == primary_id || c.linked_id.as_ref() == Some(primary_id)),
        )
    }

    pub(super) fn create(&mut self, new: NewContact, now: DateTime<Utc>) -> Contact {
        let contact = new.into_contact(ContactId::generate(), now);
        self.insert(contact.clone());
        contact
    }

    pub(super) fn update(
        &mut self,
        id: &ContactId,
        patch: &ContactPatch,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        match self.contacts.get_mut(id).filter(|c| !c.is_deleted()) {
            Some(contact) => {
                patch.apply(contact, now);
                Ok(())
            }
            None => Err(IdentityError::ContactNotFound { id: id.to_string() }),
        }
    }

    pub(super) fn update_many(
        &mut self,
        filter: &ContactFilter,
        patch: &ContactPatch,
        now: DateTime<Utc>,
    ) -> usize {
        let mut touched = 0;
        for contact in self.contacts.values_mut().filter(|c| filter.matches(c)) {
            patch.apply(contact, now);
            touched += 1;
        }
        touched
    }

    fn live(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values().filter(|c| !c.is_deleted())
    }
}

fn sorted<'a>(contacts: impl Iterator<Item = &'a Contact>) -> Vec<Contact> {
    let mut out: Vec<Contact> = contacts.cloned().collect();
    out.sort_by(Contact::seniority_cmp);
    out
}
