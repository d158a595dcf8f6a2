//! Archive credential and listing types.

use serde::{Deserialize, Serialize};

/// Connection credentials for a remote archive.
///
/// `base_url` is the root of the file store (for WebDAV, the DAV collection URL);
/// every path handed to [`RemoteArchiveStore`](crate::RemoteArchiveStore) is resolved
/// relative to it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveCredentials {
    /// Base URL of the archive, e.g. `https://dav.example.com/remote.php/webdav`.
    pub base_url: String,
    /// HTTP Basic username.
    pub username: String,
    /// HTTP Basic password.
    pub password: String,
}

impl ArchiveCredentials {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for ArchiveCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
