use serde::{Deserialize, Serialize};

use crate::contact::ContactId;

/// Public projection of one resolved cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedView {
    pub primary_contact_id: ContactId,
    /// Primary's email first, then dependents' in cluster order, de-duplicated.
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub secondary_contact_ids: Vec<ContactId>,
}

impl ConsolidatedView {
    /// Number of records in the cluster, primary included.
    pub fn cluster_size(&self) -> usize {
        self.secondary_contact_ids.len() + 1
    }
}
