use super::StorageError;

/// Top-level error for every identity operation.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The request is malformed; the caller can fix it.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    #[error("contact not found: {id}")]
    ContactNotFound { id: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {reason}")]
    Config { reason: String },
}

impl IdentityError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Client errors map to a 4xx response; everything else is a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Whether the consolidation engine should restart the call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}
