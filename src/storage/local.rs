//! Local filesystem storage implementation.
//!
//! Mirrors the bucket layout on disk for development and testing.
//! Production deployments should use `S3Store`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {bucket}/
//!     └── known_announcement_ids.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::KnownIds;
use crate::storage::{StateStore, decode_ids, encode_ids};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store the object at `{root}/{bucket}/{key}`.
    pub fn new(root: impl AsRef<Path>, bucket: &str, key: &str) -> Self {
        Self {
            path: root.as_ref().join(bucket).join(key),
        }
    }

    /// Path of the identifier object.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::store(self.location(), e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl StateStore for LocalStore {
    async fn load(&self) -> Result<KnownIds> {
        match self.read_bytes().await? {
            Some(bytes) => {
                let body = String::from_utf8(bytes)
                    .map_err(|e| AppError::store(self.location(), e))?;
                decode_ids(&body, &self.location())
            }
            None => {
                log::info!("No known-id object at {}, starting empty", self.location());
                Ok(KnownIds::new())
            }
        }
    }

    async fn save(&self, ids: &KnownIds) -> Result<()> {
        let bytes = encode_ids(ids)?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::store(self.location(), e))?;
        log::info!("Wrote {} known ids to {}", ids.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ids(values: &[&str]) -> KnownIds {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_load_missing_object_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "listing-state", "ids.json");

        let loaded = store.load().await.unwrap();
        assert!(loaded.is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "listing-state", "ids.json");

        store.save(&ids(&["FOO", "BAR"])).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, ids(&["BAR", "FOO"]));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_object() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "listing-state", "ids.json");

        store.save(&ids(&["FOO", "BAR"])).await.unwrap();
        store.save(&ids(&["BAZ"])).await.unwrap();

        assert_eq!(store.load().await.unwrap(), ids(&["BAZ"]));
    }

    #[tokio::test]
    async fn test_reads_legacy_single_id_object() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "listing-state", "latest_article_id.txt");
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.path(), "231001\n").await.unwrap();

        assert_eq!(store.load().await.unwrap(), ids(&["231001"]));
    }

    #[tokio::test]
    async fn test_truncated_object_fails_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "listing-state", "ids.json");
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.path(), "[\n  \"binance-will-list-bar-bar\",\n")
            .await
            .unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_object_is_store_error() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path(), "listing-state", "ids.json");
        // A directory where the object should be cannot be read as a file.
        tokio::fs::create_dir_all(store.path()).await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
    }
}
