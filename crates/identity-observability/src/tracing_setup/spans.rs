//! Span definitions per operation.

/// Span around one `consolidate` call.
#[macro_export]
macro_rules! consolidation_span {
    ($email:expr, $phone:expr) => {
        tracing::info_span!(
            "identity.consolidate",
            email = ?$email,
            phone_number = ?$phone,
            attempt = tracing::field::Empty,
        )
    };
}

/// Span around a store transaction.
#[macro_export]
macro_rules! storage_span {
    ($operation:expr) => {
        tracing::debug_span!("identity.storage", operation = %$operation)
    };
}

