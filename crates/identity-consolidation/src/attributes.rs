//! The "does this request add anything new" predicate.

use std::collections::HashSet;

use identity_core::contact::Contact;

/// Every email and phone number present anywhere in a cluster.
#[derive(Debug, Default)]
pub struct ClusterAttributes<'a> {
    emails: HashSet<&'a str>,
    phone_numbers: HashSet<&'a str>,
}

impl<'a> ClusterAttributes<'a> {
    pub fn collect(cluster: &'a [Contact]) -> Self {
        let mut attrs = Self::default();
        for contact in cluster {
            if let Some(email) = contact.email.as_deref().filter(|e| !e.is_empty()) {
                attrs.emails.insert(email);
            }
            if let Some(phone) = contact.phone_number.as_deref().filter(|p| !p.is_empty()) {
                attrs.phone_numbers.insert(phone);
            }
        }
        attrs
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    pub fn contains_phone_number(&self, phone_number: &str) -> bool {
        self.phone_numbers.contains(phone_number)
    }

    /// True iff at least one given value is absent from the cluster.
    /// The values may already exist on different records; that still counts as known.
    pub fn introduces_new_fact(&self, email: Option<&str>, phone_number: Option<&str>) -> bool {
        email.is_some_and(|e| !self.contains_email(e))
            || phone_number.is_some_and(|p| !self.contains_phone_number(p))
    }
}
