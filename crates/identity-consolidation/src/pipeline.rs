//! The consolidation pipeline, run against one open transaction.
//!
//! match → resolve → merge → dedup check → insert → refetch → format.

use std::collections::BTreeSet;

use identity_core::contact::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use identity_core::errors::{IdentityError, IdentityResult};
use identity_core::models::ConsolidatedView;
use identity_core::traits::IContactStore;
use identity_observability::tracing_setup::events;
use tracing::debug;

use crate::attributes::ClusterAttributes;
use crate::formatter::ViewFormatter;
use crate::resolver::{ClusterResolution, ClusterResolver};

/// Everything one pipeline run changed, before it is committed.
#[derive(Debug)]
pub(crate) struct PipelineResult {
    pub view: ConsolidatedView,
    pub primary_created: bool,
    pub secondary_created: bool,
    pub demoted: Vec<ContactId>,
    pub reparented: usize,
    pub promoted: Option<ContactId>,
}

pub(crate) fn run_pipeline<S>(
    store: &S,
    email: Option<&str>,
    phone_number: Option<&str>,
) -> IdentityResult<PipelineResult>
where
    S: IContactStore + ?Sized,
{
    let matches = store.find_matching(email, phone_number)?;
    let linked = follow_links(store, &matches)?;

    let Some(resolution) = ClusterResolver::resolve(&matches, &linked) else {
        let primary = store.create(NewContact::primary(
            email.map(str::to_string),
            phone_number.map(str::to_string),
        ))?;
        debug!(id = %primary.id, "created primary contact");
        return Ok(PipelineResult {
            view: ViewFormatter::format(&primary, &[]),
            primary_created: true,
            secondary_created: false,
            demoted: Vec::new(),
            reparented: 0,
            promoted: None,
        });
    };

    let canonical_id = resolution.canonical.id.clone();
    let reparented = merge(store, &resolution, matches.len())?;

    let cluster = store.find_cluster(&canonical_id)?;
    let secondary_created = ClusterAttributes::collect(&cluster)
        .introduces_new_fact(email, phone_number);
    let cluster = if secondary_created {
        let secondary = store.create(NewContact::secondary(
            email.map(str::to_string),
            phone_number.map(str::to_string),
            canonical_id.clone(),
        ))?;
        debug!(id = %secondary.id, primary = %canonical_id, "created secondary contact");
        store.find_cluster(&canonical_id)?
    } else {
        cluster
    };

    let primary = canonical_in(&cluster, &canonical_id)?;
    Ok(PipelineResult {
        view: ViewFormatter::format(primary, &cluster),
        primary_created: false,
        secondary_created,
        demoted: resolution.demotions.iter().map(|c| c.id.clone()).collect(),
        reparented,
        promoted: resolution.promoted.then(|| canonical_id.clone()),
    })
}

/// Fetch link targets round by round until every chain ends at a primary,
/// a dangling id, or a record already seen.
fn follow_links<S>(store: &S, matches: &[Contact]) -> IdentityResult<Vec<Contact>>
where
    S: IContactStore + ?Sized,
{
    let mut requested = BTreeSet::new();
    let mut linked = Vec::new();
    loop {
        let pending: BTreeSet<ContactId> = ClusterResolver::pending_links(matches, &linked)
            .into_iter()
            .filter(|id| !requested.contains(id))
            .collect();
        if pending.is_empty() {
            return Ok(linked);
        }
        linked.extend(store.find_by_ids(&pending)?);
        requested.extend(pending);
    }
}

/// Apply the resolution. Returns how many dependents were re-parented.
fn merge<S>(store: &S, resolution: &ClusterResolution, matched: usize) -> IdentityResult<usize>
where
    S: IContactStore + ?Sized,
{
    let canonical_id = &resolution.canonical.id;

    if resolution.promoted {
        store.update(canonical_id, &ContactPatch::promote())?;
        events::integrity_fallback(canonical_id.as_str(), matched);
    }

    let mut reparented = 0;
    for demoted in &resolution.demotions {
        store.update(&demoted.id, &ContactPatch::demote_to(canonical_id.clone()))?;
        reparented += store.update_many(
            &ContactFilter::LinkedTo(demoted.id.clone()),
            &ContactPatch::reparent(canonical_id.clone()),
        )?;
    }
    for orphan in &resolution.orphans {
        reparented += store.update_many(
            &ContactFilter::LinkedTo(orphan.clone()),
            &ContactPatch::reparent(canonical_id.clone()),
        )?;
    }

    if !resolution.demotions.is_empty() || reparented > 0 {
        events::clusters_merged(canonical_id.as_str(), resolution.demotions.len(), reparented);
    }
    Ok(reparented)
}

fn canonical_in<'a>(cluster: &'a [Contact], id: &ContactId) -> IdentityResult<&'a Contact> {
    cluster
        .iter()
        .find(|c| &c.id == id)
        .ok_or_else(|| IdentityError::ContactNotFound {
            id: id.to_string(),
        })
}
