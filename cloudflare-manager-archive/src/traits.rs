use async_trait::async_trait;

use crate::error::Result;

/// Remote archive store Trait
///
/// A flat file store addressed by slash-separated paths relative to the archive's base URL.
/// Every call is a single network round-trip with no retry; callers must expect any call to
/// fail transiently (see [`ArchiveError::is_transient`](crate::ArchiveError::is_transient)).
#[async_trait]
pub trait RemoteArchiveStore: Send + Sync {
    /// Backend identifier, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Check that the archive is reachable and accepts the credentials.
    async fn test_connection(&self) -> Result<()>;

    /// Write `bytes` to `path`, replacing any existing file.
    ///
    /// # Arguments
    /// * `path` - File path, e.g. `/cloudflare-manager/cloudflare_backup_20240101_120000.json`
    /// * `bytes` - File content
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<()>;

    /// Read the file at `path`.
    ///
    /// Returns [`ArchiveError::NotFound`](crate::ArchiveError::NotFound) when it does not exist.
    async fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// List the names of the files directly under `prefix` (collections are excluded).
    ///
    /// A missing `prefix` yields an empty list rather than an error.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete the file at `path`.
    async fn delete(&self, path: &str) -> Result<()>;
}
