//! Projection of a resolved cluster into [`ConsolidatedView`].

use std::collections::HashSet;

use identity_core::contact::Contact;
use identity_core::models::ConsolidatedView;

pub struct ViewFormatter;

impl ViewFormatter {
    /// Primary's values first, then dependents' in the given order; empties and
    /// repeats skipped. `dependents` may include the primary itself.
    pub fn format(primary: &Contact, dependents: &[Contact]) -> ConsolidatedView {
        let mut emails = Ordered::default();
        let mut phone_numbers = Ordered::default();
        emails.push(primary.email.as_deref());
        phone_numbers.push(primary.phone_number.as_deref());

        let mut secondary_contact_ids = Vec::new();
        for contact in dependents {
            if contact.id != primary.id {
                secondary_contact_ids.push(contact.id.clone());
            }
            emails.push(contact.email.as_deref());
            phone_numbers.push(contact.phone_number.as_deref());
        }

        ConsolidatedView {
            primary_contact_id: primary.id.clone(),
            emails: emails.values,
            phone_numbers: phone_numbers.values,
            secondary_contact_ids,
        }
    }
}

/// Insertion-ordered set of non-empty strings.
#[derive(Default)]
struct Ordered {
    seen: HashSet<String>,
    values: Vec<String>,
}

impl Ordered {
    fn push(&mut self, value: Option<&str>) {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        if self.seen.insert(value.to_string()) {
            self.values.push(value.to_string());
        }
    }
}
