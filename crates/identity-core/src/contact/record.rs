//! Stored contact record: identifier, role, and seniority ordering.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned contact identifier.
///
/// Opaque to callers. Ordering is lexicographic on the underlying string, which
/// is what seniority tie-breaks rely on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Fresh UUID v4 identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContactId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContactId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Role of a contact within its cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
    Primary,
    Secondary,
}

impl LinkPrecedence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            _ => None,
        }
    }
}

impl fmt::Display for LinkPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single partial identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Set iff `link_precedence` is secondary. Always names the cluster primary.
    pub linked_id: Option<ContactId>,
    pub link_precedence: LinkPrecedence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Deleted contacts never reach resolution.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn is_primary(&self) -> bool {
        self.link_precedence == LinkPrecedence::Primary
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Seniority ordering: older first, then the smaller id.
    pub fn seniority_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email.as_deref() == Some(email)
    }

    pub fn has_phone_number(&self, phone_number: &str) -> bool {
        self.phone_number.as_deref() == Some(phone_number)
    }
}
