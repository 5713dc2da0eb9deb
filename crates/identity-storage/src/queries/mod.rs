pub mod contact_crud;
pub mod contact_query;

use chrono::{DateTime, SecondsFormat, Utc};

use identity_core::errors::IdentityResult;

use crate::to_storage_err;

/// Columns in the order `row_to_contact` reads them.
pub(crate) const CONTACT_COLUMNS: &str =
    "id, email, phone_number, linked_id, link_precedence, created_at, updated_at, deleted_at";

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub(crate) fn format_ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> IdentityResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp {raw:?}: {e}")))
}
