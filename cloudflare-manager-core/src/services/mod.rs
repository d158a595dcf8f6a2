//! Business logic service layer

mod account_service;
mod backup_service;
mod import_export_service;
mod remote_config_service;
mod restore_service;

pub use account_service::AccountService;
pub use backup_service::{BackupService, BackupWorker};
pub use import_export_service::ImportExportService;
pub use remote_config_service::RemoteConfigService;
pub use restore_service::RestoreService;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use cloudflare_manager_archive::RemoteArchiveStore;

use crate::error::{CoreError, CoreResult};
use crate::traits::{ArchiveRegistry, LocalStore, RemoteConfigRepository};
use crate::types::{Account, OrphanZonePolicy, RemoteConfig, Zone};

/// Service context - holds all dependencies
///
/// The platform layer builds it once and injects its storage implementations.
pub struct ServiceContext {
    local_store: Arc<dyn LocalStore>,
    remote_config_repository: Arc<dyn RemoteConfigRepository>,
    archive_registry: Arc<dyn ArchiveRegistry>,
    orphan_zone_policy: OrphanZonePolicy,
    /// Serializes restore, import, per-row writes and snapshot reads
    structural_lock: Mutex<()>,
}

impl ServiceContext {
    /// Create a service context
    #[must_use]
    pub fn new(
        local_store: Arc<dyn LocalStore>,
        remote_config_repository: Arc<dyn RemoteConfigRepository>,
        archive_registry: Arc<dyn ArchiveRegistry>,
        orphan_zone_policy: OrphanZonePolicy,
    ) -> Self {
        Self {
            local_store,
            remote_config_repository,
            archive_registry,
            orphan_zone_policy,
            structural_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn local_store(&self) -> &Arc<dyn LocalStore> {
        &self.local_store
    }

    #[must_use]
    pub fn remote_config_repository(&self) -> &Arc<dyn RemoteConfigRepository> {
        &self.remote_config_repository
    }

    #[must_use]
    pub fn archive_registry(&self) -> &Arc<dyn ArchiveRegistry> {
        &self.archive_registry
    }

    #[must_use]
    pub fn orphan_zone_policy(&self) -> OrphanZonePolicy {
        self.orphan_zone_policy
    }

    /// Take the single-writer lock over the account/zone graph.
    pub async fn lock_structure(&self) -> MutexGuard<'_, ()> {
        self.structural_lock.lock().await
    }

    /// Saved remote configuration, or `NoRemoteConfigured`.
    pub async fn remote_config(&self) -> CoreResult<RemoteConfig> {
        self.remote_config_repository
            .load()
            .await?
            .ok_or(CoreError::NoRemoteConfigured)
    }

    /// Archive client for `config`, reused while its credentials stay the same.
    pub async fn remote_archive(
        &self,
        config: &RemoteConfig,
    ) -> CoreResult<Arc<dyn RemoteArchiveStore>> {
        self.archive_registry
            .get_or_create(&config.credentials())
            .await
    }

    /// Every account with its zones. Callers hold the structural lock.
    pub(crate) async fn read_graph(&self) -> CoreResult<(Vec<Account>, HashMap<i64, Vec<Zone>>)> {
        let accounts = self.local_store.list_accounts().await?;
        let mut zones_by_account = HashMap::with_capacity(accounts.len());
        for account in &accounts {
            let zones = self
                .local_store
                .list_zones_by_account(account.local_id)
                .await?;
            zones_by_account.insert(account.local_id, zones);
        }
        Ok((accounts, zones_by_account))
    }
}

/// Log a failed operation at a level matching its kind.
pub(crate) fn log_failure(operation: &str, err: &CoreError) {
    if err.is_expected() {
        log::warn!("{operation} failed: {err}");
    } else {
        log::error!("{operation} failed: {err}");
    }
}
