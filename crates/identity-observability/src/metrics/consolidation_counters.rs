use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters, shared across worker threads.
#[derive(Debug, Default)]
pub struct ConsolidationCounters {
    calls: AtomicU64,
    primaries_created: AtomicU64,
    secondaries_created: AtomicU64,
    demotions: AtomicU64,
    reparented: AtomicU64,
    integrity_fallbacks: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`ConsolidationCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub calls: u64,
    pub primaries_created: u64,
    pub secondaries_created: u64,
    pub demotions: u64,
    pub reparented: u64,
    pub integrity_fallbacks: u64,
    pub retries: u64,
    pub failures: u64,
}

impl ConsolidationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_primary_created(&self) {
        self.primaries_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_secondary_created(&self) {
        self.secondaries_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_merge(&self, demotions: usize, reparented: usize) {
        self.demotions.fetch_add(demotions as u64, Ordering::Relaxed);
        self.reparented.fetch_add(reparented as u64, Ordering::Relaxed);
    }

    pub fn record_integrity_fallback(&self) {
        self.integrity_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            primaries_created: self.primaries_created.load(Ordering::Relaxed),
            secondaries_created: self.secondaries_created.load(Ordering::Relaxed),
            demotions: self.demotions.load(Ordering::Relaxed),
            reparented: self.reparented.load(Ordering::Relaxed),
            integrity_fallbacks: self.integrity_fallbacks.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
