//! Shared fixtures and the cluster invariant checker.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use identity_core::contact::{Contact, ContactId, NewContact};
use identity_core::traits::{IContactStore, ITransactionalStore};
use identity_storage::{MemoryStore, StorageEngine};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

pub fn primary(id: &str, email: Option<&str>, phone: Option<&str>, secs: i64) -> Contact {
    NewContact::primary(email.map(String::from), phone.map(String::from))
        .into_contact(ContactId::from(id), at(secs))
}

pub fn secondary(id: &str, email: Option<&str>, phone: Option<&str>, parent: &str, secs: i64) -> Contact {
    NewContact::secondary(
        email.map(String::from),
        phone.map(String::from),
        ContactId::from(parent),
    )
    .into_contact(ContactId::from(id), at(secs))
}

pub fn sqlite_store(seed: &[Contact]) -> Arc<dyn ITransactionalStore> {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.import(seed).unwrap();
    Arc::new(engine)
}

pub fn memory_store(seed: &[Contact]) -> Arc<dyn ITransactionalStore> {
    let store = MemoryStore::new();
    store.import(seed.to_vec()).unwrap();
    Arc::new(store)
}

/// Every live contact reachable through the given emails and phone numbers.
pub fn live_contacts<S>(store: &S, emails: &[String], phones: &[String]) -> Vec<Contact>
where
    S: IContactStore + ?Sized,
{
    let mut found = BTreeMap::new();
    let lookups = emails
        .iter()
        .map(|e| (Some(e.as_str()), None))
        .chain(phones.iter().map(|p| (None, Some(p.as_str()))));
    for (email, phone) in lookups {
        for contact in store.find_matching(email, phone).unwrap() {
            found.insert(contact.id.clone(), contact);
        }
    }
    found.into_values().collect()
}

/// Cluster invariants over a set of live contacts:
/// primaries carry no link, every secondary links to a live primary, and
/// each component connected by shared values or links has exactly one primary.
pub fn assert_invariants(contacts: &[Contact]) {
    let live: Vec<&Contact> = contacts.iter().filter(|c| !c.is_deleted()).collect();
    let by_id: HashMap<&ContactId, &Contact> = live.iter().map(|c| (&c.id, *c)).collect();

    for contact in &live {
        if contact.is_primary() {
            assert!(contact.linked_id.is_none(), "primary {} has a link", contact.id);
        } else {
            let parent = contact
                .linked_id
                .as_ref()
                .unwrap_or_else(|| panic!("secondary {} has no link", contact.id));
            let parent = by_id
                .get(parent)
                .unwrap_or_else(|| panic!("secondary {} links to missing {parent}", contact.id));
            assert!(parent.is_primary(), "secondary {} links to a secondary", contact.id);
        }
    }

    let mut components = UnionFind::new(live.len());
    let index: HashMap<&ContactId, usize> =
        live.iter().enumerate().map(|(i, c)| (&c.id, i)).collect();
    let mut first_with_email: HashMap<&str, usize> = HashMap::new();
    let mut first_with_phone: HashMap<&str, usize> = HashMap::new();
    for (i, contact) in live.iter().enumerate() {
        if let Some(email) = contact.email.as_deref() {
            let j = *first_with_email.entry(email).or_insert(i);
            components.union(i, j);
        }
        if let Some(phone) = contact.phone_number.as_deref() {
            let j = *first_with_phone.entry(phone).or_insert(i);
            components.union(i, j);
        }
        if let Some(j) = contact.linked_id.as_ref().and_then(|id| index.get(id)) {
            components.union(i, *j);
        }
    }

    let mut primaries_per_root: HashMap<usize, usize> = HashMap::new();
    for (i, contact) in live.iter().enumerate() {
        let root = components.find(i);
        let entry = primaries_per_root.entry(root).or_default();
        if contact.is_primary() {
            *entry += 1;
        }
    }
    for (root, primaries) in primaries_per_root {
        assert_eq!(
            primaries, 1,
            "component rooted at {} has {primaries} primaries",
            live[root].id
        );
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}
