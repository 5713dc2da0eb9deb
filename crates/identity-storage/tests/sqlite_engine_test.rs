//! SQLite-specific behavior: persistence, WAL, lock contention, import.

use std::sync::Arc;

use identity_core::config::StorageConfig;
use identity_core::contact::*;
use identity_core::errors::{IdentityError, StorageError};
use identity_core::traits::{IContactStore, ITransactionalStore};
use identity_storage::pool::pragmas::verify_wal_mode;
use identity_storage::StorageEngine;

#[test]
fn contacts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("contacts.db");

    let id = {
        let engine = StorageEngine::open(&db_path).unwrap();
        let c = engine
            .create(NewContact::primary(Some("a@x.com".into()), Some("111".into())))
            .unwrap();
        c.id
    };

    let engine = StorageEngine::open(&db_path).unwrap();
    let found = engine.find_by_id(&id).unwrap().expect("contact should persist");
    assert_eq!(found.email.as_deref(), Some("a@x.com"));
    assert_eq!(found.phone_number.as_deref(), Some("111"));
    assert_eq!(engine.contact_count().unwrap(), 1);
    assert_eq!(engine.primary_count().unwrap(), 1);
}

#[test]
fn open_from_config_uses_configured_path_and_pool_size() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("configured.db");
    let config = StorageConfig {
        db_path: db_path.to_string_lossy().into_owned(),
        read_pool_size: 2,
        ..StorageConfig::default()
    };

    let engine = StorageEngine::open_from_config(&config).unwrap();
    assert_eq!(engine.pool().readers.size(), 2);
    assert_eq!(engine.pool().db_path.as_deref(), Some(db_path.as_path()));
    engine
        .create(NewContact::primary(Some("a@x.com".into()), None))
        .unwrap();
    drop(engine);

    assert!(db_path.exists());
    let reopened = StorageEngine::open(&db_path).unwrap();
    assert_eq!(reopened.contact_count().unwrap(), 1);
}

#[test]
fn file_engine_runs_in_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StorageEngine::open(&dir.path().join("wal.db")).unwrap();
    let wal = engine
        .pool()
        .writer
        .with_conn_sync(verify_wal_mode)
        .unwrap();
    assert!(wal);
}

#[test]
fn timestamps_roundtrip_at_microsecond_precision() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let created = engine
        .create(NewContact::primary(None, Some("555".into())))
        .unwrap();
    let fetched = engine.find_by_id(&created.id).unwrap().unwrap();
    assert_eq!(fetched.created_at, created.created_at);
    assert_eq!(fetched, created);
}

#[test]
fn second_writer_sees_busy_while_transaction_open() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("busy.db");
    let config = StorageConfig {
        busy_timeout_ms: 50,
        ..StorageConfig::default()
    };
    let first = StorageEngine::open_with_config(&db_path, &config).unwrap();
    let second = StorageEngine::open_with_config(&db_path, &config).unwrap();

    let tx = first.begin().unwrap();
    tx.create(NewContact::primary(Some("a@x.com".into()), None))
        .unwrap();

    let err = match second.begin() {
        Ok(_) => panic!("second writer should not get the lock"),
        Err(e) => e,
    };
    assert!(err.is_retryable(), "expected busy, got {err}");
    assert!(matches!(
        err,
        IdentityError::Storage(StorageError::Busy { .. })
    ));

    tx.commit().unwrap();
    let tx = second.begin().expect("lock is free after commit");
    assert_eq!(tx.find_matching(Some("a@x.com"), None).unwrap().len(), 1);
}

#[test]
fn secondary_without_link_is_rejected_by_schema() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let primary = engine
        .create(NewContact::primary(Some("a@x.com".into()), None))
        .unwrap();
    // Re-parenting a primary without demoting it would leave a linked primary.
    let err = engine
        .update(&primary.id, &ContactPatch::reparent(ContactId::from("other")))
        .unwrap_err();
    assert!(matches!(err, IdentityError::Storage(_)));
}

#[test]
fn import_is_atomic() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = chrono::Utc::now();
    let a = NewContact::primary(Some("a@x.com".into()), None).into_contact(ContactId::from("dup"), now);
    let b = NewContact::primary(Some("b@x.com".into()), None).into_contact(ContactId::from("dup"), now);

    assert!(engine.import(&[a, b]).is_err());
    assert_eq!(engine.contact_count().unwrap(), 0);
}

#[test]
fn concurrent_reads_during_transactions() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(StorageEngine::open(&dir.path().join("concurrent.db")).unwrap());

    for i in 0..10 {
        engine
            .create(NewContact::primary(Some(format!("init-{i}@x.com")), None))
            .unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            for i in 0..10 {
                let found = engine
                    .find_matching(Some(format!("init-{i}@x.com").as_str()), None)
                    .unwrap();
                assert_eq!(found.len(), 1);
            }
        }));
    }

    let writer_engine = Arc::clone(&engine);
    let writer = std::thread::spawn(move || {
        for i in 10..20 {
            let tx = writer_engine.begin().unwrap();
            tx.create(NewContact::primary(Some(format!("write-{i}@x.com")), None))
                .unwrap();
            tx.commit().unwrap();
        }
    });

    writer.join().expect("writer should not panic");
    for handle in handles {
        handle.join().expect("reader should not panic");
    }
    assert_eq!(engine.contact_count().unwrap(), 20);
}
