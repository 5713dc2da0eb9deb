pub mod view;
pub mod wire;

pub use view::ConsolidatedView;
pub use wire::{IdentifyRequest, IdentifyResponse};
