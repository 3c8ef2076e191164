//! File-backed store tests

use std::sync::Arc;
use tether_kv::{KvStore, Location, MemoryStorage, StorageBackend, flate};

#[test]
fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.redb");
    let path = path.to_str().unwrap();

    {
        let store = KvStore::open(path).unwrap();
        assert!(!store.is_memory());
        store.set_item("token", "abc123").unwrap();
    }

    let store = KvStore::open(path).unwrap();
    assert_eq!(store.get_item("token").unwrap().as_deref(), Some("abc123"));
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_packed_payload_under_location_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.redb");
    let store = KvStore::open(path.to_str().unwrap()).unwrap();

    let location = Location::for_app("clipboardinator", "0.1.0");
    let payload = b"first line\nsecond line\n".repeat(20);
    store
        .set_item(&location.key(), &flate::zip64(&payload).unwrap())
        .unwrap();

    let packed = store.get_item(&location.key()).unwrap().unwrap();
    assert_eq!(flate::unzip64(packed).unwrap(), payload);
}

#[test]
fn test_backends_behave_alike() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alike.redb");
    let backends: Vec<Arc<dyn StorageBackend>> = vec![
        Arc::new(MemoryStorage::new()),
        Arc::new(KvStore::open(":memory:").unwrap()),
        Arc::new(KvStore::open(path.to_str().unwrap()).unwrap()),
    ];

    for backend in backends {
        assert!(backend.is_empty().unwrap(), "{}", backend.name());
        backend.set_item("a", "1").unwrap();
        backend.set_item("b", "2").unwrap();
        backend.set_item("a", "3").unwrap();
        assert_eq!(backend.len().unwrap(), 2, "{}", backend.name());
        assert_eq!(backend.get_item("a").unwrap().as_deref(), Some("3"));
        assert!(backend.remove_item("b").unwrap());
        assert!(!backend.remove_item("b").unwrap());
        backend.clear().unwrap();
        assert!(backend.keys().unwrap().is_empty(), "{}", backend.name());
    }
}
