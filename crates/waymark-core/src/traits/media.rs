//! Media blob store trait for pluggable storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for media blob storage backends.
///
/// The core stores and deletes blobs by path and never inspects their
/// contents. A local filesystem implementation lives in `waymark-storage`;
/// object-store backends can be plugged in behind the same trait.
#[async_trait]
pub trait MediaStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the store type name (e.g., "local").
    fn store_type(&self) -> &str;

    /// Write bytes to the given path, creating parents as needed.
    async fn save(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Read a stored blob into memory.
    async fn read(&self, path: &str) -> AppResult<Bytes>;

    /// Delete the blob at the given path. Deleting a missing path is not an
    /// error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Delete every blob under the given path prefix.
    async fn delete_prefix(&self, prefix: &str) -> AppResult<()>;

    /// Whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
