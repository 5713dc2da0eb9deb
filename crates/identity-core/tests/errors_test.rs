use identity_core::errors::*;

#[test]
fn validation_error_is_client_error() {
    let err = IdentityError::validation("either email or phoneNumber must be provided");
    assert!(err.is_client_error());
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("phoneNumber"));
}

#[test]
fn contact_not_found_carries_id() {
    let err = IdentityError::ContactNotFound {
        id: "abc-123".into(),
    };
    assert!(err.to_string().contains("abc-123"));
    assert!(!err.is_client_error());
}

#[test]
fn busy_storage_error_is_retryable() {
    let err: IdentityError = StorageError::Busy {
        message: "database is locked".into(),
    }
    .into();
    assert!(err.is_retryable());
    assert!(!err.is_client_error());
}

#[test]
fn other_storage_errors_are_not_retryable() {
    let errors = [
        StorageError::Sqlite {
            message: "disk full".into(),
        },
        StorageError::Backend {
            message: "gone".into(),
        },
        StorageError::RetriesExhausted {
            attempts: 3,
            last_error: "store busy: locked".into(),
        },
        StorageError::MigrationFailed {
            version: 2,
            reason: "bad".into(),
        },
    ];
    for e in errors {
        let err: IdentityError = e.into();
        assert!(!err.is_retryable(), "{err} should not be retryable");
    }
}

#[test]
fn retries_exhausted_reports_attempts() {
    let err = StorageError::RetriesExhausted {
        attempts: 7,
        last_error: "store busy: database is locked".into(),
    };
    let message = err.to_string();
    assert!(message.contains('7'));
    assert!(message.contains("database is locked"));
}
