//! Storage contract tests
//!
//! Every check runs against both the single-lock and the sharded store.

use bytes::Bytes;
use recordstore::{MemoryRecordStore, RecordStorage, ShardedRecordStore, StorageError};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, SystemTime};

fn stores() -> Vec<(&'static str, Arc<dyn RecordStorage>)> {
    vec![
        ("memory", Arc::new(MemoryRecordStore::new()) as Arc<dyn RecordStorage>),
        ("sharded", Arc::new(ShardedRecordStore::new(8)) as Arc<dyn RecordStorage>),
    ]
}

fn t(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn test_get_never_added() {
    for (name, store) in stores() {
        for key in ["", "user:1", "ключ", "a/b/c"] {
            assert_eq!(store.get(key), Err(StorageError::EntryNotFound), "{}", name);
        }
    }
}

#[test]
fn test_lifecycle_scenario() {
    for (name, store) in stores() {
        store.add("user:1", Bytes::from_static(b"alice"), t(0)).unwrap();
        let got = store.get("user:1").unwrap();
        assert_eq!((&got.value[..], got.version), (&b"alice"[..], 0), "{}", name);

        store.update("user:1", Bytes::from_static(b"alicia"), t(1), 0).unwrap();
        let got = store.get("user:1").unwrap();
        assert_eq!((&got.value[..], got.version), (&b"alicia"[..], 1), "{}", name);

        assert_eq!(
            store.update("user:1", Bytes::from_static(b"bob"), t(2), 0),
            Err(StorageError::EntryNotFound),
            "{}",
            name
        );
        assert_eq!(store.get("user:1").unwrap().value, Bytes::from_static(b"alicia"));

        store.delete("user:1").unwrap();
        assert_eq!(store.get("user:1"), Err(StorageError::EntryNotFound), "{}", name);
        assert_eq!(store.delete("user:1"), Err(StorageError::EntryNotFound), "{}", name);
    }
}

#[test]
fn test_duplicate_add_rejected() {
    for (name, store) in stores() {
        store.add("k", Bytes::from_static(b"v1"), t(0)).unwrap();
        assert_eq!(
            store.add("k", Bytes::from_static(b"v2"), t(1)),
            Err(StorageError::EntryAlreadyExists),
            "{}",
            name
        );
        let got = store.get("k").unwrap();
        assert_eq!(got.value, Bytes::from_static(b"v1"));
        assert_eq!(got.version, 0);
    }
}

#[test]
fn test_versions_increase_by_one() {
    for (name, store) in stores() {
        store.add("k", Bytes::new(), t(0)).unwrap();
        for expected in 0..50 {
            store
                .update("k", Bytes::from(expected.to_string()), t(expected), expected)
                .unwrap();
            assert_eq!(store.get("k").unwrap().version, expected + 1, "{}", name);
        }
    }
}

#[test]
fn test_update_never_added() {
    for (name, store) in stores() {
        assert_eq!(
            store.update("ghost", Bytes::from_static(b"v"), t(0), 0),
            Err(StorageError::EntryNotFound),
            "{}",
            name
        );
        assert_eq!(store.get("ghost"), Err(StorageError::EntryNotFound));
    }
}

#[test]
fn test_empty_value_is_a_value() {
    for (name, store) in stores() {
        store.add("empty", Bytes::new(), t(0)).unwrap();
        let got = store.get("empty").unwrap();
        assert!(got.value.is_empty(), "{}", name);
        assert_eq!(got.version, 0);
    }
}

#[test]
fn test_parallel_add_same_key() {
    const THREADS: usize = 32;

    for (name, store) in stores() {
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let value = Bytes::from(format!("writer-{}", i));
                    (value.clone(), store.add("contended", value, SystemTime::now()))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
        assert_eq!(winners.len(), 1, "{}", name);
        assert!(results
            .iter()
            .filter(|(_, r)| r.is_err())
            .all(|(_, r)| *r == Err(StorageError::EntryAlreadyExists)));

        let got = store.get("contended").unwrap();
        assert_eq!(got.value, winners[0].0, "{}", name);
        assert_eq!(got.version, 0);
    }
}

#[test]
fn test_parallel_update_same_version() {
    for (name, store) in stores() {
        store.add("cas", Bytes::from_static(b"start"), t(0)).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let observed = store.get("cas").unwrap().version;
                    barrier.wait();
                    store.update("cas", Bytes::from(format!("w{}", i)), SystemTime::now(), observed)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "{}", name);
        assert_eq!(
            results.iter().filter(|r| **r == Err(StorageError::EntryNotFound)).count(),
            1,
            "{}",
            name
        );
        assert_eq!(store.get("cas").unwrap().version, 1);
    }
}

#[test]
fn test_cas_retry_loop_loses_no_updates() {
    const THREADS: u64 = 8;
    const INCREMENTS: u64 = 200;

    for (name, store) in stores() {
        store.add("counter", Bytes::from_static(b"0"), t(0)).unwrap();

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..INCREMENTS {
                        loop {
                            let current = store.get("counter").unwrap();
                            let n: u64 = std::str::from_utf8(&current.value)
                                .unwrap()
                                .parse()
                                .unwrap();
                            let next = Bytes::from((n + 1).to_string());
                            match store.update("counter", next, SystemTime::now(), current.version) {
                                Ok(()) => break,
                                Err(StorageError::EntryNotFound) => continue,
                                Err(e) => panic!("unexpected error: {}", e),
                            }
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let got = store.get("counter").unwrap();
        assert_eq!(got.version, THREADS * INCREMENTS, "{}", name);
        assert_eq!(got.value, Bytes::from((THREADS * INCREMENTS).to_string()));
    }
}

#[test]
fn test_timestamps_do_not_affect_behavior() {
    for (name, store) in stores() {
        assert!(!store.tracks_timestamps(), "{}", name);

        // A creation time far in the past does not expire the record
        store.add("old", Bytes::from_static(b"v"), SystemTime::UNIX_EPOCH).unwrap();
        store.update("old", Bytes::from_static(b"w"), SystemTime::UNIX_EPOCH, 0).unwrap();
        assert_eq!(store.get("old").unwrap().version, 1);
    }
}
