//! Blob store abstraction over the cache directory.
//!
//! The cache treats the filesystem as a plain key-value store of
//! (path, bytes) pairs. Modeling it as a trait keeps the verified-fetch
//! logic testable against an in-memory fake.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::error::{MirrorError, MirrorResult};

/// Key-value store for cached blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob at `path`, or `None` if absent.
    async fn get(&self, path: &Path) -> MirrorResult<Option<Vec<u8>>>;

    /// Write `bytes` at `path`, replacing any prior content.
    ///
    /// A put either completes fully or leaves the prior content intact;
    /// partially written entries must never be observable.
    async fn put(&self, path: &Path, bytes: &[u8]) -> MirrorResult<()>;
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone, Default)]
pub struct FsBlobStore;

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &Path) -> MirrorResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MirrorError::Filesystem {
                path: path.to_path_buf(),
                message: format!("failed to read cached blob: {}", e),
            }),
        }
    }

    async fn put(&self, path: &Path, bytes: &[u8]) -> MirrorResult<()> {
        write_atomic(path, bytes).await
    }
}

/// Write `bytes` to `path` via a temp file and rename, so readers never see
/// a partial write.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> MirrorResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, bytes)
        .await
        .map_err(|e| MirrorError::Filesystem {
            path: temp_path.clone(),
            message: format!("failed to write temp file: {}", e),
        })?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| MirrorError::Filesystem {
            path: path.to_path_buf(),
            message: format!("failed to rename temp file: {}", e),
        })?;

    Ok(())
}

/// In-memory blob store, a substitutable fake for tests and embedders.
#[derive(Debug, Default)]
pub struct MemBlobStore {
    blobs: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("store mutex poisoned").len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemBlobStore {
    async fn get(&self, path: &Path) -> MirrorResult<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .lock()
            .expect("store mutex poisoned")
            .get(path)
            .cloned())
    }

    async fn put(&self, path: &Path, bytes: &[u8]) -> MirrorResult<()> {
        self.blobs
            .lock()
            .expect("store mutex poisoned")
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fs_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore;
        let path = temp_dir.path().join("blob.pem");

        store.put(&path, b"content").await.unwrap();
        let read = store.get(&path).await.unwrap();
        assert_eq!(read.as_deref(), Some(b"content".as_slice()));
    }

    #[tokio::test]
    async fn fs_store_absent_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore;

        let read = store.get(&temp_dir.path().join("missing")).await.unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn fs_store_put_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore;
        let path = temp_dir.path().join("blob.pem");

        store.put(&path, b"old").await.unwrap();
        store.put(&path, b"new").await.unwrap();
        let read = store.get(&path).await.unwrap();
        assert_eq!(read.as_deref(), Some(b"new".as_slice()));
    }

    #[tokio::test]
    async fn fs_store_put_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore;
        let path = temp_dir.path().join("blob.pem");

        store.put(&path, b"content").await.unwrap();

        let mut entries = fs::read_dir(temp_dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name();
            assert!(
                !name.to_string_lossy().ends_with(".tmp"),
                "temp file should not remain: {:?}",
                name
            );
        }
    }

    #[tokio::test]
    async fn mem_store_roundtrip() {
        let store = MemBlobStore::new();
        let path = Path::new("/virtual/blob.pem");

        assert!(store.get(path).await.unwrap().is_none());
        store.put(path, b"content").await.unwrap();
        assert_eq!(
            store.get(path).await.unwrap().as_deref(),
            Some(b"content".as_slice())
        );
        assert_eq!(store.len(), 1);
    }
}
