//! # identity-observability
//!
//! Tracing subscriber setup, span macros, structured events, and the
//! counters the consolidation engine records into.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{ConsolidationCounters, CountersSnapshot};
pub use tracing_setup::init_tracing;
