//! Remote archive configuration

use serde::{Deserialize, Serialize};

use cloudflare_manager_archive::ArchiveCredentials;

/// Directory used when none is configured.
pub const DEFAULT_BACKUP_PATH: &str = "/cloudflare-manager/";

/// Persisted singleton describing where snapshots are archived.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    /// WebDAV base URL
    pub url: String,
    pub username: String,
    pub password: String,
    /// Always starts and ends with `/`
    #[serde(default = "default_backup_path")]
    pub backup_path: String,
    /// Upload a snapshot after every account mutation
    #[serde(default)]
    pub auto_backup: bool,
}

fn default_backup_path() -> String {
    DEFAULT_BACKUP_PATH.to_string()
}

impl RemoteConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            backup_path: default_backup_path(),
            auto_backup: false,
        }
    }

    #[must_use]
    pub fn with_backup_path(mut self, path: &str) -> Self {
        self.backup_path = normalize_backup_path(path);
        self
    }

    #[must_use]
    pub fn with_auto_backup(mut self, enabled: bool) -> Self {
        self.auto_backup = enabled;
        self
    }

    #[must_use]
    pub fn credentials(&self) -> ArchiveCredentials {
        ArchiveCredentials::new(&self.url, &self.username, &self.password)
    }

    /// Archive path of a snapshot file inside the backup directory.
    #[must_use]
    pub fn snapshot_path(&self, file_name: &str) -> String {
        format!("{}{file_name}", normalize_backup_path(&self.backup_path))
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("backup_path", &self.backup_path)
            .field("auto_backup", &self.auto_backup)
            .finish()
    }
}

/// Force a leading and trailing `/`; blank input yields the default path.
#[must_use]
pub fn normalize_backup_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        if path.trim().is_empty() {
            return default_backup_path();
        }
        return "/".to_string();
    }
    format!("/{trimmed}/")
}
