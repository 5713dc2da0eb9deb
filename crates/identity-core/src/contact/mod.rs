pub mod patch;
pub mod record;

pub use patch::{ContactFilter, ContactPatch, NewContact};
pub use record::{Contact, ContactId, LinkPrecedence};
