//! # identity-consolidation
//!
//! Resolves which stored contacts describe one person, merges clusters under
//! the most senior primary, records new facts as secondaries, and projects
//! the result into the public view.
//!
//! Pipeline per call: match → resolve → merge → dedup check → insert →
//! refetch → format, all inside one store transaction.

pub mod async_facade;
pub mod attributes;
pub mod engine;
pub mod formatter;
mod pipeline;
pub mod resolver;

pub use async_facade::AsyncConsolidator;
pub use attributes::ClusterAttributes;
pub use engine::{ConsolidationEngine, ConsolidationOutcome, ConsolidationReport};
pub use formatter::ViewFormatter;
pub use resolver::{ClusterResolution, ClusterResolver};
