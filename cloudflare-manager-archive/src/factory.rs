//! Archive factory function.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::RemoteArchiveStore;
use crate::types::ArchiveCredentials;
use crate::webdav::WebDavArchive;

/// Creates a [`RemoteArchiveStore`] instance from the given credentials.
///
/// The returned store is wrapped in `Arc<dyn RemoteArchiveStore>` for easy sharing
/// across async tasks. No request is sent; call
/// [`test_connection`](RemoteArchiveStore::test_connection) to verify the credentials.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudflare_manager_archive::{create_archive, ArchiveCredentials};
///
/// let archive = create_archive(ArchiveCredentials::new(
///     "https://dav.example.com/remote.php/webdav",
///     "alice",
///     "app-password",
/// ))
/// .unwrap();
/// ```
pub fn create_archive(credentials: ArchiveCredentials) -> Result<Arc<dyn RemoteArchiveStore>> {
    Ok(Arc::new(WebDavArchive::new(credentials)?))
}
