//! Read queries: attribute matching, id lookup, cluster fetch, counts.

use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, Connection, Params, Statement};

use identity_core::constants::MAX_IDS_PER_QUERY;
use identity_core::contact::{Contact, ContactId};
use identity_core::errors::IdentityResult;

use super::contact_crud::row_to_contact;
use super::CONTACT_COLUMNS;
use crate::from_sqlite;

/// Non-deleted contacts sharing the email OR the phone number, oldest first.
pub fn find_matching(
    conn: &Connection,
    email: Option<&str>,
    phone_number: Option<&str>,
) -> IdentityResult<Vec<Contact>> {
    let (clause, values): (&str, Vec<&str>) = match (email, phone_number) {
        (Some(e), Some(p)) => ("(email = ? OR phone_number = ?)", vec![e, p]),
        (Some(e), None) => ("email = ?", vec![e]),
        (None, Some(p)) => ("phone_number = ?", vec![p]),
        (None, None) => return Ok(Vec::new()),
    };
    let sql = format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE deleted_at IS NULL AND {clause}
         ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(from_sqlite)?;
    collect(&mut stmt, params_from_iter(values))
}

/// Non-deleted contacts among `ids`, oldest first.
pub fn find_by_ids(conn: &Connection, ids: &BTreeSet<ContactId>) -> IdentityResult<Vec<Contact>> {
    let ids: Vec<&ContactId> = ids.iter().collect();
    let mut found = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE deleted_at IS NULL AND id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql).map_err(from_sqlite)?;
        found.extend(collect(
            &mut stmt,
            params_from_iter(chunk.iter().map(|id| id.as_str())),
        )?);
    }
    found.sort_by(Contact::seniority_cmp);
    Ok(found)
}

/// The primary and its dependents, oldest first.
pub fn find_cluster(conn: &Connection, primary_id: &ContactId) -> IdentityResult<Vec<Contact>> {
    let sql = format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE deleted_at IS NULL AND (id = ?1 OR linked_id = ?1)
         ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(from_sqlite)?;
    collect(&mut stmt, params![primary_id.as_str()])
}

/// Count of non-deleted contacts.
pub fn count_contacts(conn: &Connection) -> IdentityResult<usize> {
    count(conn, "SELECT COUNT(*) FROM contacts WHERE deleted_at IS NULL")
}

/// Count of non-deleted primaries.
pub fn count_primaries(conn: &Connection) -> IdentityResult<usize> {
    count(
        conn,
        "SELECT COUNT(*) FROM contacts WHERE deleted_at IS NULL AND link_precedence = 'primary'",
    )
}

fn count(conn: &Connection, sql: &str) -> IdentityResult<usize> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0)).map_err(from_sqlite)?;
    Ok(n as usize)
}

fn collect<P: Params>(stmt: &mut Statement<'_>, params: P) -> IdentityResult<Vec<Contact>> {
    let rows = stmt
        .query_map(params, |row| Ok(row_to_contact(row)))
        .map_err(from_sqlite)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(from_sqlite)??);
    }
    Ok(out)
}
