//! Pure cluster resolution: decides which primary survives a merge.

use std::collections::{BTreeMap, BTreeSet};

use identity_core::contact::{Contact, ContactId, LinkPrecedence};

/// What the merge step must do to collapse the matched clusters into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterResolution {
    /// The surviving primary. Already reflects promotion when `promoted` is set.
    pub canonical: Contact,
    /// Losing primaries, senior first.
    pub demotions: Vec<Contact>,
    /// Link targets of matched or fetched secondaries that are not a live
    /// primary. Everything linked to one of these is re-parented to `canonical`.
    pub orphans: BTreeSet<ContactId>,
    /// True when no primary was reachable and `canonical` was a secondary.
    pub promoted: bool,
}

impl ClusterResolution {
    /// Whether any record must be rewritten before the cluster is consistent.
    pub fn requires_merge(&self) -> bool {
        self.promoted || !self.demotions.is_empty() || !self.orphans.is_empty()
    }
}

pub struct ClusterResolver;

impl ClusterResolver {
    /// Link targets of any secondary in `matches` or `linked` that appear in
    /// neither. The caller fetches these into `linked` until none remain, which
    /// walks a chain of secondaries up to its primary, then calls
    /// [`ClusterResolver::resolve`].
    pub fn pending_links(matches: &[Contact], linked: &[Contact]) -> BTreeSet<ContactId> {
        let known: BTreeSet<&ContactId> = matches.iter().chain(linked).map(|c| &c.id).collect();
        matches
            .iter()
            .chain(linked)
            .filter_map(|c| c.linked_id.as_ref())
            .filter(|id| !known.contains(id))
            .cloned()
            .collect()
    }

    /// Resolve matched contacts (plus every record fetched while following
    /// their links) into a single cluster. `None` when nothing matched.
    pub fn resolve(matches: &[Contact], linked: &[Contact]) -> Option<ClusterResolution> {
        if matches.is_empty() {
            return None;
        }

        let mut candidates: BTreeMap<&ContactId, &Contact> = BTreeMap::new();
        for contact in matches.iter().chain(linked) {
            if contact.is_primary() && !contact.is_deleted() {
                candidates.insert(&contact.id, contact);
            }
        }

        let mut ranked: Vec<&Contact> = candidates.values().copied().collect();
        ranked.sort_by(|a, b| a.seniority_cmp(b));

        let (canonical, demotions, promoted) = match ranked.split_first() {
            Some((senior, rest)) => (
                (*senior).clone(),
                rest.iter().map(|c| (*c).clone()).collect(),
                false,
            ),
            None => {
                let oldest = matches.iter().min_by(|a, b| a.seniority_cmp(b))?;
                let mut canonical = oldest.clone();
                canonical.link_precedence = LinkPrecedence::Primary;
                canonical.linked_id = None;
                (canonical, Vec::new(), true)
            }
        };

        let orphans = matches
            .iter()
            .chain(linked.iter().filter(|c| !c.is_deleted()))
            .filter_map(|c| c.linked_id.as_ref())
            .filter(|id| !candidates.contains_key(id) && **id != canonical.id)
            .cloned()
            .collect();

        Some(ClusterResolution {
            canonical,
            demotions,
            orphans,
            promoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use identity_core::contact::NewContact;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn primary(id: &str, secs: i64) -> Contact {
        NewContact::primary(Some(format!("{id}@x.com")), None)
            .into_contact(ContactId::from(id), at(secs))
    }

    fn secondary(id: &str, to: &str, secs: i64) -> Contact {
        NewContact::secondary(Some(format!("{id}@x.com")), None, ContactId::from(to))
            .into_contact(ContactId::from(id), at(secs))
    }

    fn ids(contacts: &[Contact]) -> Vec<&str> {
        contacts.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_matches_resolve_to_nothing() {
        assert!(ClusterResolver::resolve(&[], &[]).is_none());
    }

    #[test]
    fn single_primary_is_canonical_without_merge() {
        let p = primary("p1", 0);
        let s = secondary("s1", "p1", 5);
        let res = ClusterResolver::resolve(&[p.clone(), s], &[]).unwrap();
        assert_eq!(res.canonical, p);
        assert!(!res.requires_merge());
    }

    #[test]
    fn oldest_primary_wins_and_others_are_demoted() {
        let p1 = primary("p1", 10);
        let p2 = primary("p2", 5);
        let p3 = primary("p3", 20);
        let res = ClusterResolver::resolve(&[p2.clone(), p1.clone(), p3.clone()], &[]).unwrap();
        assert_eq!(res.canonical.id, p2.id);
        assert_eq!(ids(&res.demotions), vec!["p1", "p3"]);
        assert!(!res.promoted);
    }

    #[test]
    fn equal_timestamps_break_ties_by_smaller_id() {
        let a = primary("aaa", 7);
        let b = primary("bbb", 7);
        let res = ClusterResolver::resolve(&[b, a.clone()], &[]).unwrap();
        assert_eq!(res.canonical.id, a.id);
    }

    #[test]
    fn linked_primaries_of_matched_secondaries_are_candidates() {
        let s = secondary("s1", "p1", 30);
        let p1 = primary("p1", 1);
        let p2 = primary("p2", 10);
        let matches = vec![p2.clone(), s.clone()];

        let links = ClusterResolver::pending_links(&matches, &[]);
        assert_eq!(links.into_iter().collect::<Vec<_>>(), vec![ContactId::from("p1")]);

        let res = ClusterResolver::resolve(&matches, &[p1.clone()]).unwrap();
        assert_eq!(res.canonical.id, p1.id);
        assert_eq!(ids(&res.demotions), vec!["p2"]);
        assert!(res.orphans.is_empty());
    }

    #[test]
    fn matched_link_targets_are_not_unresolved() {
        let p = primary("p1", 0);
        let s = secondary("s1", "p1", 1);
        assert!(ClusterResolver::pending_links(&[p, s], &[]).is_empty());
    }

    #[test]
    fn no_reachable_primary_promotes_oldest_match() {
        let s1 = secondary("s1", "gone", 20);
        let s2 = secondary("s2", "gone", 10);
        let res = ClusterResolver::resolve(&[s1, s2.clone()], &[]).unwrap();
        assert!(res.promoted);
        assert_eq!(res.canonical.id, s2.id);
        assert!(res.canonical.is_primary());
        assert_eq!(res.canonical.linked_id, None);
        assert_eq!(res.orphans.into_iter().collect::<Vec<_>>(), vec![ContactId::from("gone")]);
    }

    #[test]
    fn deleted_linked_primary_is_not_a_candidate() {
        let s = secondary("s1", "p1", 20);
        let mut p1 = primary("p1", 0);
        p1.deleted_at = Some(at(50));
        let p2 = primary("p2", 10);
        let res = ClusterResolver::resolve(&[s, p2.clone()], &[p1]).unwrap();
        assert_eq!(res.canonical.id, p2.id);
        assert!(res.orphans.contains(&ContactId::from("p1")));
    }

    #[test]
    fn chained_secondary_reaches_primary_through_fetched_links() {
        let p3 = primary("p3", 0);
        let s1 = secondary("s1", "p3", 5);
        let s2 = secondary("s2", "s1", 10);
        let matches = vec![s2.clone()];

        let first = ClusterResolver::pending_links(&matches, &[]);
        assert_eq!(first.into_iter().collect::<Vec<_>>(), vec![ContactId::from("s1")]);
        let second = ClusterResolver::pending_links(&matches, &[s1.clone()]);
        assert_eq!(second.into_iter().collect::<Vec<_>>(), vec![ContactId::from("p3")]);
        assert!(ClusterResolver::pending_links(&matches, &[s1.clone(), p3.clone()]).is_empty());

        let res = ClusterResolver::resolve(&matches, &[s1, p3.clone()]).unwrap();
        assert!(!res.promoted);
        assert_eq!(res.canonical.id, p3.id);
        assert_eq!(res.orphans.into_iter().collect::<Vec<_>>(), vec![ContactId::from("s1")]);
    }

    #[test]
    fn secondary_pointing_at_a_secondary_is_orphaned() {
        let p = primary("p1", 0);
        let chained = secondary("s2", "s1", 5);
        let middle = secondary("s1", "p1", 3);
        let res = ClusterResolver::resolve(&[chained, p.clone()], &[middle]).unwrap();
        assert_eq!(res.canonical.id, p.id);
        assert!(res.orphans.contains(&ContactId::from("s1")));
    }
}
