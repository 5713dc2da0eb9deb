//! # identity-core
//!
//! Foundation crate for identity consolidation.
//! Defines the contact model, the store traits, errors, config, and the
//! request/response wire types. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod contact;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::IdentityConfig;
pub use contact::{Contact, ContactFilter, ContactId, ContactPatch, LinkPrecedence, NewContact};
pub use errors::{IdentityError, IdentityResult, StorageError};
pub use models::{ConsolidatedView, IdentifyRequest, IdentifyResponse};
