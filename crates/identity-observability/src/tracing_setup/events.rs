//! Structured events with stable field names.

use tracing::{info, warn};

/// No live primary was reachable; the oldest match was promoted.
pub fn integrity_fallback(promoted_id: &str, matched: usize) {
    warn!(
        promoted_id,
        matched,
        "no reachable primary for matched contacts; promoted oldest match"
    );
}

/// Two or more clusters were merged under one primary.
pub fn clusters_merged(primary_id: &str, demoted: usize, reparented: usize) {
    info!(primary_id, demoted, reparented, "clusters merged");
}

/// The store reported a conflict and the call will be retried.
pub fn retrying(attempt: u32, max_attempts: u32, error: &dyn std::fmt::Display) {
    warn!(attempt, max_attempts, error = %error, "store busy; retrying consolidation");
}
