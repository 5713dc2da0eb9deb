//! Counters recorded by the consolidation engine.

pub mod consolidation_counters;

pub use consolidation_counters::{ConsolidationCounters, CountersSnapshot};
