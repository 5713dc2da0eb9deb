//! Concurrent consolidation: racing merges must still leave one primary per
//! connected identity and every secondary linked to it.

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use identity_consolidation::ConsolidationEngine;
use identity_core::config::ConsolidationConfig;
use identity_core::traits::ITransactionalStore;
use identity_storage::{MemoryStore, StorageEngine};

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 30;

fn pools() -> (Vec<String>, Vec<String>) {
    let emails = (0..6).map(|i| format!("user{i}@x.com")).collect();
    let phones = (0..6).map(|i| format!("55500{i}")).collect();
    (emails, phones)
}

/// Deterministic per-thread request stream; some calls omit one attribute.
fn request(
    thread: usize,
    call: usize,
    emails: &[String],
    phones: &[String],
) -> (Option<String>, Option<String>) {
    let seed = thread * 7919 + call * 104_729;
    let email = emails[seed % emails.len()].clone();
    let phone = phones[(seed / 7) % phones.len()].clone();
    match seed % 5 {
        0 => (Some(email), None),
        1 => (None, Some(phone)),
        _ => (Some(email), Some(phone)),
    }
}

fn hammer(engines: Vec<Arc<ConsolidationEngine>>) {
    let (emails, phones) = pools();
    let mut handles = vec![];
    for t in 0..THREADS {
        let engine = Arc::clone(&engines[t % engines.len()]);
        let (emails, phones) = (emails.clone(), phones.clone());
        handles.push(thread::spawn(move || {
            for call in 0..CALLS_PER_THREAD {
                let (email, phone) = request(t, call, &emails, &phones);
                let view = engine
                    .consolidate(email.as_deref(), phone.as_deref())
                    .expect("consolidation should succeed under contention");
                if let Some(email) = &email {
                    assert!(view.emails.contains(email));
                }
                if let Some(phone) = &phone {
                    assert!(view.phone_numbers.contains(phone));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker should not panic");
    }

    let all = live_contacts(&**engines[0].store(), &emails, &phones);
    assert!(!all.is_empty());
    assert_invariants(&all);
}

#[test]
fn concurrent_calls_on_shared_sqlite_engine() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ITransactionalStore> =
        Arc::new(StorageEngine::open(&dir.path().join("race.db")).unwrap());
    hammer(vec![Arc::new(ConsolidationEngine::new(store))]);
}

#[test]
fn concurrent_calls_across_sqlite_connections() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("race-multi.db");
    let config = ConsolidationConfig {
        max_attempts: 10,
        retry_backoff_ms: 5,
    };
    let engines = (0..3)
        .map(|_| {
            let store = Arc::new(StorageEngine::open(&db_path).unwrap());
            Arc::new(ConsolidationEngine::with_config(store, config.clone()))
        })
        .collect();
    hammer(engines);
}

#[test]
fn concurrent_calls_on_memory_store() {
    let store = Arc::new(MemoryStore::new());
    hammer(vec![Arc::new(ConsolidationEngine::new(store.clone()))]);
    assert_invariants(&store.snapshot().unwrap());
    assert_eq!(store.begin_count(), THREADS * CALLS_PER_THREAD);
}
