//! Application bootstrap for Cloudflare Manager.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter
//! injection). With the `sqlite-store` feature it also ships `SqliteStore`.

pub mod adapters;

use std::sync::Arc;

use cloudflare_manager_core::error::{CoreError, CoreResult};
use cloudflare_manager_core::services::{
    AccountService, BackupService, BackupWorker, ImportExportService, RemoteConfigService,
    RestoreService, ServiceContext,
};
use cloudflare_manager_core::traits::{
    ArchiveRegistry, InMemoryArchiveRegistry, LocalStore, RemoteConfigRepository,
};
use cloudflare_manager_core::types::OrphanZonePolicy;

/// Platform-agnostic application state.
///
/// Holds all services and the `ServiceContext`. Every frontend constructs this
/// once at startup via `AppStateBuilder`, then spawns the returned
/// `BackupWorker`.
pub struct AppState {
    /// Service context (holds all storage adapters)
    pub ctx: Arc<ServiceContext>,
    /// Per-row account and zone writes
    pub account_service: Arc<AccountService>,
    /// Manual backups, automatic backup queue and status
    pub backup_service: Arc<BackupService>,
    pub restore_service: RestoreService,
    pub import_export_service: ImportExportService,
    pub remote_config_service: RemoteConfigService,
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `local_store`: where accounts and zones live
/// - `remote_config_repository`: where the archive configuration lives
///
/// # Optional
/// - `archive_registry`: defaults to `InMemoryArchiveRegistry`
/// - `orphan_zone_policy`: defaults to `OrphanZonePolicy::Drop`
#[derive(Default)]
pub struct AppStateBuilder {
    local_store: Option<Arc<dyn LocalStore>>,
    remote_config_repository: Option<Arc<dyn RemoteConfigRepository>>,
    archive_registry: Option<Arc<dyn ArchiveRegistry>>,
    orphan_zone_policy: OrphanZonePolicy,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn local_store(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    #[must_use]
    pub fn remote_config_repository(mut self, repo: Arc<dyn RemoteConfigRepository>) -> Self {
        self.remote_config_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn archive_registry(mut self, registry: Arc<dyn ArchiveRegistry>) -> Self {
        self.archive_registry = Some(registry);
        self
    }

    #[must_use]
    pub fn orphan_zone_policy(mut self, policy: OrphanZonePolicy) -> Self {
        self.orphan_zone_policy = policy;
        self
    }

    /// Build the `AppState` and the worker that runs automatic backups.
    ///
    /// The worker must be driven (`tokio::spawn(worker.run())`) for
    /// automatic backups to happen; it exits once the state is dropped.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<(AppState, BackupWorker)> {
        let local_store = self
            .local_store
            .ok_or_else(|| CoreError::ValidationError("local_store is required".to_string()))?;
        let remote_config_repository = self.remote_config_repository.ok_or_else(|| {
            CoreError::ValidationError("remote_config_repository is required".to_string())
        })?;
        let archive_registry = self
            .archive_registry
            .unwrap_or_else(|| Arc::new(InMemoryArchiveRegistry::new()));

        let ctx = Arc::new(ServiceContext::new(
            local_store,
            remote_config_repository,
            archive_registry,
            self.orphan_zone_policy,
        ));

        let (backup_service, worker) = BackupService::new(Arc::clone(&ctx));
        let backup_service = Arc::new(backup_service);
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&ctx),
            Arc::clone(&backup_service),
        ));
        let restore_service = RestoreService::new(Arc::clone(&ctx));
        let import_export_service =
            ImportExportService::new(Arc::clone(&ctx), Arc::clone(&backup_service));
        let remote_config_service = RemoteConfigService::new(Arc::clone(&ctx));

        Ok((
            AppState {
                ctx,
                account_service,
                backup_service,
                restore_service,
                import_export_service,
                remote_config_service,
            },
            worker,
        ))
    }
}
