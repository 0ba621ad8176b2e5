//! Local filesystem media store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_core::traits::MediaStore;

/// Media store backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalMediaStore {
    /// Create a new local media store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn store_type(&self) -> &str {
        "local"
    }

    async fn save(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Stored blob");
        Ok(())
    }

    async fn read(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {path}"),
                e,
            )),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<()> {
        let full_path = self.resolve(prefix);
        match fs::remove_dir_all(&full_path).await {
            Ok(()) => {
                debug!(prefix, "Deleted blob directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob directory: {prefix}"),
                e,
            )),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalMediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_read_delete_roundtrip() {
        let (_dir, store) = store().await;
        let path = "activities/a1/waypoints_media/clip.mp3";

        store.save(path, Bytes::from_static(b"audio")).await.unwrap();
        assert!(store.exists(path).await.unwrap());
        assert_eq!(store.read(path).await.unwrap(), Bytes::from_static(b"audio"));

        store.delete(path).await.unwrap();
        assert!(!store.exists(path).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let (_dir, store) = store().await;
        store.delete("nope/missing.bin").await.unwrap();
        store.delete_prefix("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_prefix_removes_tree() {
        let (_dir, store) = store().await;
        store
            .save("activities/a2/waypoints_media/a.jpg", Bytes::from_static(b"a"))
            .await
            .unwrap();
        store
            .save("activities/a2/activity.gpx", Bytes::from_static(b"<gpx/>"))
            .await
            .unwrap();

        store.delete_prefix("activities/a2").await.unwrap();
        assert!(!store.exists("activities/a2/activity.gpx").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.read("missing.bin").await.unwrap_err();
        assert_eq!(err.kind, waymark_core::error::ErrorKind::NotFound);
    }
}
