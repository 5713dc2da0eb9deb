//! Insert, get, update, bulk update, and import for contacts.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use chrono::{DateTime, Utc};
use identity_core::constants::MAX_IDS_PER_QUERY;
use identity_core::contact::{
    Contact, ContactFilter, ContactId, ContactPatch, LinkPrecedence, NewContact,
};
use identity_core::errors::{IdentityError, IdentityResult};

use super::{format_ts, parse_ts, CONTACT_COLUMNS};
use crate::{from_sqlite, to_storage_err};

/// Insert a fully-formed contact row.
pub fn insert_contact(conn: &Connection, contact: &Contact) -> IdentityResult<()> {
    conn.execute(
        "INSERT INTO contacts (
            id, email, phone_number, linked_id, link_precedence,
            created_at, updated_at, deleted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            contact.id.as_str(),
            contact.email,
            contact.phone_number,
            contact.linked_id.as_ref().map(ContactId::as_str),
            contact.link_precedence.as_str(),
            format_ts(&contact.created_at),
            format_ts(&contact.updated_at),
            contact.deleted_at.as_ref().map(format_ts),
        ],
    )
    .map_err(from_sqlite)?;
    Ok(())
}

/// Assign an id, stamp `now`, and insert.
pub fn create_contact(
    conn: &Connection,
    new: NewContact,
    now: DateTime<Utc>,
) -> IdentityResult<Contact> {
    let contact = new.into_contact(ContactId::generate(), now);
    insert_contact(conn, &contact)?;
    Ok(contact)
}

/// Get a non-deleted contact by id.
pub fn get_contact(conn: &Connection, id: &ContactId) -> IdentityResult<Option<Contact>> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND deleted_at IS NULL");
    let result = conn
        .query_row(&sql, params![id.as_str()], |row| Ok(row_to_contact(row)))
        .optional()
        .map_err(from_sqlite)?;
    result.transpose()
}

/// Patch a single non-deleted contact. Missing or deleted ids are an error.
pub fn update_contact(
    conn: &Connection,
    id: &ContactId,
    patch: &ContactPatch,
    now: DateTime<Utc>,
) -> IdentityResult<()> {
    let rows = apply_patch(
        conn,
        "id = ?",
        vec![Value::Text(id.to_string())],
        patch,
        now,
    )?;
    if rows == 0 {
        return Err(IdentityError::ContactNotFound { id: id.to_string() });
    }
    Ok(())
}

/// Patch every non-deleted contact selected by `filter`. Returns rows touched.
pub fn update_where(
    conn: &Connection,
    filter: &ContactFilter,
    patch: &ContactPatch,
    now: DateTime<Utc>,
) -> IdentityResult<usize> {
    match filter {
        ContactFilter::LinkedTo(id) => apply_patch(
            conn,
            "linked_id = ?",
            vec![Value::Text(id.to_string())],
            patch,
            now,
        ),
        ContactFilter::Ids(ids) => {
            let ids: Vec<&ContactId> = ids.iter().collect();
            let mut total = 0;
            for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let values = chunk.iter().map(|id| Value::Text(id.to_string())).collect();
                total += apply_patch(conn, &format!("id IN ({placeholders})"), values, patch, now)?;
            }
            Ok(total)
        }
    }
}

fn apply_patch(
    conn: &Connection,
    where_clause: &str,
    where_values: Vec<Value>,
    patch: &ContactPatch,
    now: DateTime<Utc>,
) -> IdentityResult<usize> {
    let stamp = format_ts(&now);
    let linked_id = patch.linked_id.clone().flatten();
    let mut values = vec![
        patch
            .link_precedence
            .map_or(Value::Null, |p| Value::Text(p.as_str().to_string())),
        Value::Integer(i64::from(patch.linked_id.is_some())),
        linked_id.map_or(Value::Null, |id| Value::Text(id.to_string())),
        Value::Integer(i64::from(patch.soft_delete)),
        Value::Text(stamp.clone()),
        Value::Text(stamp),
    ];
    values.extend(where_values);

    let sql = format!(
        "UPDATE contacts SET
            link_precedence = COALESCE(?, link_precedence),
            linked_id = CASE WHEN ? THEN ? ELSE linked_id END,
            deleted_at = CASE WHEN ? THEN ? ELSE deleted_at END,
            updated_at = ?
         WHERE deleted_at IS NULL AND {where_clause}"
    );
    conn.execute(&sql, params_from_iter(values))
        .map_err(from_sqlite)
}

/// Insert many pre-built contacts atomically. Used for seeding and imports.
pub fn import_contacts(conn: &Connection, contacts: &[Contact]) -> IdentityResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("import begin: {e}")))?;
    for contact in contacts {
        insert_contact(&tx, contact)?;
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("import commit: {e}")))?;
    Ok(contacts.len())
}

pub(crate) fn row_to_contact(row: &Row<'_>) -> IdentityResult<Contact> {
    let text = |idx: usize| -> IdentityResult<Option<String>> {
        row.get::<usize, Option<String>>(idx)
            .map_err(|e| to_storage_err(e.to_string()))
    };
    let required = |idx: usize, column: &str| -> IdentityResult<String> {
        text(idx)?.ok_or_else(|| to_storage_err(format!("contacts.{column} is NULL")))
    };

    let precedence_raw = required(4, "link_precedence")?;
    let link_precedence = LinkPrecedence::parse(&precedence_raw)
        .ok_or_else(|| to_storage_err(format!("unknown link_precedence {precedence_raw:?}")))?;

    Ok(Contact {
        id: ContactId::from(required(0, "id")?),
        email: text(1)?,
        phone_number: text(2)?,
        linked_id: text(3)?.map(ContactId::from),
        link_precedence,
        created_at: parse_ts(&required(5, "created_at")?)?,
        updated_at: parse_ts(&required(6, "updated_at")?)?,
        deleted_at: text(7)?.as_deref().map(parse_ts).transpose()?,
    })
}
