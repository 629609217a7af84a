//! Blob state-store abstraction.
//!
//! Durable key-value storage is an external collaborator in this system
//! (device NVS, a server-side KV, whatever the deployment has). This module
//! reduces it to the three operations the protocol actually needs and ships
//! an in-memory implementation for tests plus a file-backed one for hosts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, StoreError};

/// The async get/set/delete blob interface.
///
/// Implementations must be thread-safe (`Send + Sync`). Values are opaque
/// byte blobs; schema and versioning belong to the caller.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a blob, `None` when the key has never been written or was
    /// deleted.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a blob, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}

/// In-memory state store. All data is lost on drop; primarily for tests.
pub struct MemoryStateStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().unwrap().remove(key);
        Ok(())
    }
}

/// File-backed state store: one file per key under a directory.
///
/// Key names are hex-escaped into file names, so arbitrary key strings are
/// safe. Writes go through a temp file then rename, so a torn write never
/// leaves a half-blob behind.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Use `dir` as the blob directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.blob", hex::encode(key)))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStateStore::new();

        assert_eq!(store.get("device-state").await.unwrap(), None);
        store.set("device-state", b"v1").await.unwrap();
        assert_eq!(
            store.get("device-state").await.unwrap(),
            Some(b"v1".to_vec())
        );

        store.set("device-state", b"v2").await.unwrap();
        assert_eq!(
            store.get("device-state").await.unwrap(),
            Some(b"v2".to_vec())
        );

        store.delete("device-state").await.unwrap();
        assert_eq!(store.get("device-state").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_delete_missing_is_ok() {
        let store = MemoryStateStore::new();
        store.delete("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path()).unwrap();

        assert_eq!(store.get("state").await.unwrap(), None);
        store.set("state", b"{\"v\":1}").await.unwrap();
        assert_eq!(store.get("state").await.unwrap(), Some(b"{\"v\":1}".to_vec()));

        store.delete("state").await.unwrap();
        assert_eq!(store.get("state").await.unwrap(), None);
        store.delete("state").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_survives_odd_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path()).unwrap();

        let key = "../weird key/with:chars";
        store.set(key, b"safe").await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), Some(b"safe".to_vec()));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStateStore::open(dir.path()).unwrap();
            store.set("state", b"persisted").await.unwrap();
        }
        let reopened = FileStateStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("state").await.unwrap(),
            Some(b"persisted".to_vec())
        );
    }
}
