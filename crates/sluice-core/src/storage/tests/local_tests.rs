use std::path::{Path, PathBuf};
use tempfile::tempdir;

use crate::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;
use crate::storage::local::LocalStorageProvider;

// Helper function to create PathBuf from str for tests
fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn test_write_and_read_string() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let key_path = p("nested/dir/test.txt");
    provider.write_string(&key_path, "test data")?;

    assert!(provider.is_file(&key_path));
    assert!(provider.is_dir(Path::new("nested/dir")));
    assert_eq!(provider.read_to_string(&key_path)?, "test data");
    Ok(())
}

#[test]
fn test_write_replaces_existing_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let key_path = p("test.txt");
    provider.write_string(&key_path, "first")?;
    provider.write_string(&key_path, "second")?;

    assert_eq!(provider.read_to_string(&key_path)?, "second");
    Ok(())
}

#[test]
fn test_remove_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let key_path = p("test.key");
    provider.write_bytes(&key_path, b"test data")?;
    assert!(provider.exists(&key_path), "Data should exist after writing");

    provider.remove_file(&key_path)?;
    assert!(!provider.exists(&key_path), "Data should not exist after deletion");
    Ok(())
}

#[test]
fn test_read_dir_returns_relative_paths() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("dir/a.txt"), "a")?;
    provider.write_string(&p("dir/b.txt"), "b")?;

    let mut entries = provider.read_dir(&p("dir"))?;
    entries.sort();
    assert_eq!(entries, vec![p("dir/a.txt"), p("dir/b.txt")]);

    provider.remove_dir_all(&p("dir"))?;
    assert!(!provider.exists(&p("dir")));
    Ok(())
}

#[test]
fn test_read_missing_file_reports_operation() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    match provider.read_to_string(&p("missing.txt")) {
        Err(Error::StorageSystem(StorageSystemError::Io { operation, path, .. })) => {
            assert_eq!(operation, "read_to_string");
            assert!(path.ends_with("missing.txt"));
        }
        other => panic!("Expected Io error, got {:?}", other),
    }
}
