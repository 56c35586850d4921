//! Versioned blob storage shared by every interceptor of a host.
//!
//! Objects are addressed by `(namespace, id)` and hold any number of
//! immutable, integer-versioned string contents. Errors are [`StageError`]s
//! carrying [`BlobStoreErrors`] codes so interceptors can propagate them as-is.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::Error;
use crate::error_code::BlobStoreErrors;
use crate::stage_error::{Param, StageError};
use crate::storage::StorageProvider;

const BLOB_EXTENSION: &str = "blob";

pub type BlobResult<T> = std::result::Result<T, StageError>;

/// Host-managed persistent blob store
pub trait BlobStore: Send + Sync + Debug {
    /// Store a new version; existing versions are never overwritten
    fn store(&self, namespace: &str, id: &str, version: u64, content: &str) -> BlobResult<()>;

    /// Highest stored version of an object
    fn latest_version(&self, namespace: &str, id: &str) -> BlobResult<u64>;

    /// Whether any version of the object exists
    fn exists(&self, namespace: &str, id: &str) -> bool;

    fn exists_version(&self, namespace: &str, id: &str, version: u64) -> bool;

    /// All versions in ascending order, empty when the object is unknown
    fn all_versions(&self, namespace: &str, id: &str) -> BTreeSet<u64>;

    fn retrieve(&self, namespace: &str, id: &str, version: u64) -> BlobResult<String>;

    fn delete_version(&self, namespace: &str, id: &str, version: u64) -> BlobResult<()>;

    fn delete_all_versions(&self, namespace: &str, id: &str) -> BlobResult<()>;

    /// Content of the highest stored version
    fn retrieve_latest(&self, namespace: &str, id: &str) -> BlobResult<String> {
        let version = self.latest_version(namespace, id)?;
        self.retrieve(namespace, id, version)
    }
}

/// Reject names that would be ambiguous or escape a directory layout
pub fn validate_name(name: &str) -> BlobResult<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is reserved")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("only letters, digits, '-', '_' and '.' are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StageError::new(
            BlobStoreErrors::BlobStore0005,
            [Param::from(name), Param::from(reason)],
        )),
        None => Ok(()),
    }
}

fn not_found(namespace: &str, id: &str) -> StageError {
    StageError::new(BlobStoreErrors::BlobStore0001, [Param::from(id), Param::from(namespace)])
}

fn version_exists(namespace: &str, id: &str, version: u64) -> StageError {
    StageError::new(
        BlobStoreErrors::BlobStore0002,
        [Param::from(version), Param::from(id), Param::from(namespace)],
    )
}

fn version_not_found(namespace: &str, id: &str, version: u64) -> StageError {
    StageError::new(
        BlobStoreErrors::BlobStore0003,
        [Param::from(version), Param::from(id), Param::from(namespace)],
    )
}

fn storage_failure(operation: &str, err: Error) -> StageError {
    StageError::with_cause(BlobStoreErrors::BlobStore0004, [Param::from(operation)], err)
}

type Key = (String, String);

/// Blob store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<Key, BTreeMap<u64, String>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<dyn BlobStore> {
        Arc::new(Self::new())
    }

    fn key(namespace: &str, id: &str) -> Key {
        (namespace.to_string(), id.to_string())
    }
}

impl BlobStore for InMemoryBlobStore {
    fn store(&self, namespace: &str, id: &str, version: u64, content: &str) -> BlobResult<()> {
        validate_name(namespace)?;
        validate_name(id)?;
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        let versions = objects.entry(Self::key(namespace, id)).or_default();
        if versions.contains_key(&version) {
            return Err(version_exists(namespace, id, version));
        }
        versions.insert(version, content.to_string());
        Ok(())
    }

    fn latest_version(&self, namespace: &str, id: &str) -> BlobResult<u64> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects
            .get(&Self::key(namespace, id))
            .and_then(|versions| versions.keys().next_back().copied())
            .ok_or_else(|| not_found(namespace, id))
    }

    fn exists(&self, namespace: &str, id: &str) -> bool {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects
            .get(&Self::key(namespace, id))
            .is_some_and(|versions| !versions.is_empty())
    }

    fn exists_version(&self, namespace: &str, id: &str, version: u64) -> bool {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects
            .get(&Self::key(namespace, id))
            .is_some_and(|versions| versions.contains_key(&version))
    }

    fn all_versions(&self, namespace: &str, id: &str) -> BTreeSet<u64> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects
            .get(&Self::key(namespace, id))
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default()
    }

    fn retrieve(&self, namespace: &str, id: &str, version: u64) -> BlobResult<String> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        let versions = objects
            .get(&Self::key(namespace, id))
            .ok_or_else(|| not_found(namespace, id))?;
        versions
            .get(&version)
            .cloned()
            .ok_or_else(|| version_not_found(namespace, id, version))
    }

    fn delete_version(&self, namespace: &str, id: &str, version: u64) -> BlobResult<()> {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        let key = Self::key(namespace, id);
        let versions = objects.get_mut(&key).ok_or_else(|| not_found(namespace, id))?;
        if versions.remove(&version).is_none() {
            return Err(version_not_found(namespace, id, version));
        }
        if versions.is_empty() {
            objects.remove(&key);
        }
        Ok(())
    }

    fn delete_all_versions(&self, namespace: &str, id: &str) -> BlobResult<()> {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        match objects.remove(&Self::key(namespace, id)) {
            Some(_) => Ok(()),
            None => Err(not_found(namespace, id)),
        }
    }
}

/// Blob store persisted through a [`StorageProvider`].
///
/// Layout: `<root>/<namespace>/<id>/<version>.blob`. Writers are serialized
/// by an internal mutex; readers go straight to storage.
#[derive(Debug)]
pub struct LocalBlobStore {
    provider: Arc<dyn StorageProvider>,
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalBlobStore {
    pub fn new(provider: Arc<dyn StorageProvider>, root: PathBuf) -> Self {
        Self {
            provider,
            root,
            write_lock: Mutex::new(()),
        }
    }

    fn object_dir(&self, namespace: &str, id: &str) -> PathBuf {
        self.root.join(namespace).join(id)
    }

    fn version_path(&self, namespace: &str, id: &str, version: u64) -> PathBuf {
        self.object_dir(namespace, id)
            .join(format!("{}.{}", version, BLOB_EXTENSION))
    }

    fn parse_version(path: &Path) -> Option<u64> {
        if path.extension()?.to_str()? != BLOB_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let version: u64 = stem.parse().ok()?;
        // Only the canonical spelling maps back to `version_path`
        (version.to_string() == stem).then_some(version)
    }
}

impl BlobStore for LocalBlobStore {
    fn store(&self, namespace: &str, id: &str, version: u64, content: &str) -> BlobResult<()> {
        validate_name(namespace)?;
        validate_name(id)?;
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.version_path(namespace, id, version);
        if self.provider.exists(&path) {
            return Err(version_exists(namespace, id, version));
        }
        self.provider
            .write_string(&path, content)
            .map_err(|e| storage_failure("store", e))?;
        log::debug!("Stored blob {}/{} version {}", namespace, id, version);
        Ok(())
    }

    fn latest_version(&self, namespace: &str, id: &str) -> BlobResult<u64> {
        self.all_versions(namespace, id)
            .last()
            .copied()
            .ok_or_else(|| not_found(namespace, id))
    }

    fn exists(&self, namespace: &str, id: &str) -> bool {
        !self.all_versions(namespace, id).is_empty()
    }

    fn exists_version(&self, namespace: &str, id: &str, version: u64) -> bool {
        validate_name(namespace).is_ok()
            && validate_name(id).is_ok()
            && self.provider.is_file(&self.version_path(namespace, id, version))
    }

    fn all_versions(&self, namespace: &str, id: &str) -> BTreeSet<u64> {
        if validate_name(namespace).is_err() || validate_name(id).is_err() {
            return BTreeSet::new();
        }
        let dir = self.object_dir(namespace, id);
        if !self.provider.is_dir(&dir) {
            return BTreeSet::new();
        }
        match self.provider.read_dir(&dir) {
            Ok(entries) => entries
                .iter()
                .filter_map(|entry| Self::parse_version(entry))
                .collect(),
            Err(e) => {
                log::warn!("Cannot list blob versions of {}/{}: {}", namespace, id, e);
                BTreeSet::new()
            }
        }
    }

    fn retrieve(&self, namespace: &str, id: &str, version: u64) -> BlobResult<String> {
        if !self.exists(namespace, id) {
            return Err(not_found(namespace, id));
        }
        if !self.exists_version(namespace, id, version) {
            return Err(version_not_found(namespace, id, version));
        }
        self.provider
            .read_to_string(&self.version_path(namespace, id, version))
            .map_err(|e| storage_failure("retrieve", e))
    }

    fn delete_version(&self, namespace: &str, id: &str, version: u64) -> BlobResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.exists(namespace, id) {
            return Err(not_found(namespace, id));
        }
        if !self.exists_version(namespace, id, version) {
            return Err(version_not_found(namespace, id, version));
        }
        self.provider
            .remove_file(&self.version_path(namespace, id, version))
            .map_err(|e| storage_failure("delete_version", e))?;
        if self.all_versions(namespace, id).is_empty() {
            self.provider
                .remove_dir_all(&self.object_dir(namespace, id))
                .map_err(|e| storage_failure("delete_version", e))?;
        }
        Ok(())
    }

    fn delete_all_versions(&self, namespace: &str, id: &str) -> BlobResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.exists(namespace, id) {
            return Err(not_found(namespace, id));
        }
        self.provider
            .remove_dir_all(&self.object_dir(namespace, id))
            .map_err(|e| storage_failure("delete_all_versions", e))
    }
}
