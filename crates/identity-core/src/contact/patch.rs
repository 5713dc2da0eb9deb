//! Write-side shapes accepted by contact stores.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::record::{Contact, ContactId, LinkPrecedence};

/// Fields for a contact about to be created. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub linked_id: Option<ContactId>,
    pub link_precedence: LinkPrecedence,
}

impl NewContact {
    pub fn primary(email: Option<String>, phone_number: Option<String>) -> Self {
        Self {
            email,
            phone_number,
            linked_id: None,
            link_precedence: LinkPrecedence::Primary,
        }
    }

    pub fn secondary(
        email: Option<String>,
        phone_number: Option<String>,
        primary_id: ContactId,
    ) -> Self {
        Self {
            email,
            phone_number,
            linked_id: Some(primary_id),
            link_precedence: LinkPrecedence::Secondary,
        }
    }

    /// Materialize with store-assigned id and timestamp.
    pub fn into_contact(self, id: ContactId, now: DateTime<Utc>) -> Contact {
        Contact {
            id,
            email: self.email,
            phone_number: self.phone_number,
            linked_id: self.linked_id,
            link_precedence: self.link_precedence,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update. `None` leaves a field untouched; `linked_id: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub link_precedence: Option<LinkPrecedence>,
    pub linked_id: Option<Option<ContactId>>,
    pub soft_delete: bool,
}

impl ContactPatch {
    /// Make the contact a primary with no link.
    pub fn promote() -> Self {
        Self {
            link_precedence: Some(LinkPrecedence::Primary),
            linked_id: Some(None),
            soft_delete: false,
        }
    }

    /// Make the contact a secondary of `primary_id`.
    pub fn demote_to(primary_id: ContactId) -> Self {
        Self {
            link_precedence: Some(LinkPrecedence::Secondary),
            linked_id: Some(Some(primary_id)),
            soft_delete: false,
        }
    }

    /// Point an existing secondary at a new primary.
    pub fn reparent(primary_id: ContactId) -> Self {
        Self {
            link_precedence: None,
            linked_id: Some(Some(primary_id)),
            soft_delete: false,
        }
    }

    pub fn soft_delete() -> Self {
        Self {
            soft_delete: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.link_precedence.is_none() && self.linked_id.is_none() && !self.soft_delete
    }

    /// Apply in place, refreshing `updated_at` (and `deleted_at` for soft deletes).
    pub fn apply(&self, contact: &mut Contact, now: DateTime<Utc>) {
        if let Some(precedence) = self.link_precedence {
            contact.link_precedence = precedence;
        }
        if let Some(linked_id) = &self.linked_id {
            contact.linked_id = linked_id.clone();
        }
        if self.soft_delete {
            contact.deleted_at = Some(now);
        }
        contact.updated_at = now;
    }
}

/// Selector for bulk updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactFilter {
    /// Every contact whose `linked_id` equals the given id.
    LinkedTo(ContactId),
    /// An explicit id set.
    Ids(BTreeSet<ContactId>),
}

impl ContactFilter {
    /// Whether `contact` is selected. Deleted contacts are never selected.
    pub fn matches(&self, contact: &Contact) -> bool {
        if contact.is_deleted() {
            return false;
        }
        match self {
            Self::LinkedTo(id) => contact.linked_id.as_ref() == Some(id),
            Self::Ids(ids) => ids.contains(&contact.id),
        }
    }
}
