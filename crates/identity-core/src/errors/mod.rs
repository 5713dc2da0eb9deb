mod identity_error;
mod storage_error;

pub use identity_error::IdentityError;
pub use storage_error::StorageError;

/// Result alias used across the workspace.
pub type IdentityResult<T> = Result<T, IdentityError>;
