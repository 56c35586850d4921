use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;

use crate::storage::blob::{validate_name, BlobStore, InMemoryBlobStore, LocalBlobStore};
use crate::storage::local::LocalStorageProvider;
use crate::storage::StorageProvider;

fn local_store(root: &std::path::Path) -> LocalBlobStore {
    let provider: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::new(root.to_path_buf()));
    LocalBlobStore::new(provider, "blobs".into())
}

// Behaviour every implementation must share
fn exercise_versions(store: &dyn BlobStore) {
    assert!(!store.exists("rules", "geo"));
    assert!(store.all_versions("rules", "geo").is_empty());

    store.store("rules", "geo", 1, "v1").unwrap();
    store.store("rules", "geo", 3, "v3").unwrap();
    store.store("rules", "geo", 2, "v2").unwrap();

    assert!(store.exists("rules", "geo"));
    assert!(store.exists_version("rules", "geo", 2));
    assert!(!store.exists_version("rules", "geo", 4));
    assert_eq!(store.all_versions("rules", "geo"), BTreeSet::from([1, 2, 3]));
    assert_eq!(store.latest_version("rules", "geo").unwrap(), 3);
    assert_eq!(store.retrieve("rules", "geo", 2).unwrap(), "v2");
    assert_eq!(store.retrieve_latest("rules", "geo").unwrap(), "v3");

    // Same id in another namespace is a different object
    assert!(!store.exists("other", "geo"));
}

fn exercise_immutability(store: &dyn BlobStore) {
    store.store("rules", "geo", 1, "original").unwrap();
    let err = store.store("rules", "geo", 1, "replacement").unwrap_err();
    assert_eq!(err.error_code().code(), "BLOB_STORE_0002");
    assert_eq!(
        err.message(),
        "BLOB_STORE_0002 - Version 1 of object 'geo' already exists in namespace 'rules'"
    );
    assert_eq!(store.retrieve("rules", "geo", 1).unwrap(), "original");
}

fn exercise_missing(store: &dyn BlobStore) {
    let err = store.retrieve_latest("rules", "absent").unwrap_err();
    assert_eq!(err.message(), "BLOB_STORE_0001 - Object 'absent' does not exist in namespace 'rules'");

    store.store("rules", "geo", 5, "v5").unwrap();
    let err = store.retrieve("rules", "geo", 4).unwrap_err();
    assert_eq!(err.error_code().code(), "BLOB_STORE_0003");
    let err = store.delete_version("rules", "geo", 4).unwrap_err();
    assert_eq!(err.error_code().code(), "BLOB_STORE_0003");
    let err = store.delete_all_versions("rules", "absent").unwrap_err();
    assert_eq!(err.error_code().code(), "BLOB_STORE_0001");
}

fn exercise_deletes(store: &dyn BlobStore) {
    store.store("rules", "geo", 1, "v1").unwrap();
    store.store("rules", "geo", 2, "v2").unwrap();

    store.delete_version("rules", "geo", 2).unwrap();
    assert_eq!(store.latest_version("rules", "geo").unwrap(), 1);

    // Removing the last version removes the object
    store.delete_version("rules", "geo", 1).unwrap();
    assert!(!store.exists("rules", "geo"));

    store.store("rules", "geo", 7, "v7").unwrap();
    store.store("rules", "geo", 8, "v8").unwrap();
    store.delete_all_versions("rules", "geo").unwrap();
    assert!(!store.exists("rules", "geo"));
    assert!(store.latest_version("rules", "geo").is_err());
}

#[test]
fn test_in_memory_versions() {
    exercise_versions(&InMemoryBlobStore::new());
}

#[test]
fn test_in_memory_immutability() {
    exercise_immutability(&InMemoryBlobStore::new());
}

#[test]
fn test_in_memory_missing() {
    exercise_missing(&InMemoryBlobStore::new());
}

#[test]
fn test_in_memory_deletes() {
    exercise_deletes(&InMemoryBlobStore::new());
}

#[test]
fn test_local_versions() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    exercise_versions(&local_store(temp_dir.path()));
    assert!(temp_dir.path().join("blobs/rules/geo/3.blob").is_file());
}

#[test]
fn test_local_immutability() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    exercise_immutability(&local_store(temp_dir.path()));
}

#[test]
fn test_local_missing() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    exercise_missing(&local_store(temp_dir.path()));
}

#[test]
fn test_local_deletes() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    exercise_deletes(&local_store(temp_dir.path()));
    assert!(!temp_dir.path().join("blobs/rules/geo").exists());
}

#[test]
fn test_local_store_survives_reopen() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    local_store(temp_dir.path()).store("audit", "summary", 1, "{}").unwrap();

    let reopened = local_store(temp_dir.path());
    assert_eq!(reopened.retrieve_latest("audit", "summary").unwrap(), "{}");
}

#[test]
fn test_local_ignores_foreign_files() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = local_store(temp_dir.path());
    store.store("rules", "geo", 1, "v1").unwrap();
    std::fs::write(temp_dir.path().join("blobs/rules/geo/notes.txt"), "x").unwrap();
    std::fs::write(temp_dir.path().join("blobs/rules/geo/latest.blob"), "x").unwrap();

    assert_eq!(store.all_versions("rules", "geo"), BTreeSet::from([1]));
}

#[test]
fn test_local_ignores_non_canonical_version_names() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = local_store(temp_dir.path());
    store.store("rules", "geo", 1, "v1").unwrap();
    std::fs::write(temp_dir.path().join("blobs/rules/geo/007.blob"), "x").unwrap();
    std::fs::write(temp_dir.path().join("blobs/rules/geo/+9.blob"), "x").unwrap();

    assert_eq!(store.all_versions("rules", "geo"), BTreeSet::from([1]));
    assert_eq!(store.latest_version("rules", "geo").unwrap(), 1);
    for version in store.all_versions("rules", "geo") {
        assert!(store.retrieve("rules", "geo", version).is_ok());
    }
}

#[test]
fn test_invalid_names_rejected() {
    assert!(validate_name("geo-rules_v2.1").is_ok());
    for name in ["", ".", "..", "a/b", "white space"] {
        let err = validate_name(name).unwrap_err();
        assert_eq!(err.error_code().code(), "BLOB_STORE_0005", "name {:?}", name);
    }

    let store = InMemoryBlobStore::new();
    assert!(store.store("../escape", "geo", 1, "x").is_err());
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let local = local_store(temp_dir.path());
    assert!(local.store("rules", "../../etc", 1, "x").is_err());
    assert!(!local.exists("rules", "../../etc"));
}

#[test]
fn test_concurrent_stores_of_distinct_versions() {
    let store = InMemoryBlobStore::shared();
    let handles: Vec<_> = (1..=8u64)
        .map(|version| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.store("shared", "counter", version, &version.to_string()))
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread panicked").unwrap();
    }

    assert_eq!(store.all_versions("shared", "counter").len(), 8);
    assert_eq!(store.retrieve_latest("shared", "counter").unwrap(), "8");
}
