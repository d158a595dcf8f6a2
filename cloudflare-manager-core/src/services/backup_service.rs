//! Snapshot upload, manual and automatic
//!
//! Automatic backups flow through one channel: services report successful
//! writes with [`BackupService::on_mutation`], and a single [`BackupWorker`]
//! consumes the events one at a time.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};

use crate::error::{CoreError, CoreResult};
use crate::services::{log_failure, ServiceContext};
use crate::snapshot::{self, naming};
use crate::types::{BackupOutcome, BackupPhase, BackupStatus, MutationEvent};

/// State shared by the service and its worker.
struct BackupEngine {
    ctx: Arc<ServiceContext>,
    status: watch::Sender<BackupStatus>,
}

impl BackupEngine {
    async fn run(&self) -> CoreResult<String> {
        self.status.send_modify(|s| {
            s.attempts += 1;
            s.phase = BackupPhase::BuildingSnapshot;
        });

        let result = self.build_and_upload().await;

        let outcome = match &result {
            Ok(file_name) => BackupOutcome::Succeeded {
                file_name: file_name.clone(),
                at: Utc::now(),
            },
            Err(e) => BackupOutcome::Failed {
                reason: e.to_string(),
                at: Utc::now(),
            },
        };
        self.status.send_modify(|s| {
            s.phase = BackupPhase::Idle;
            s.last_outcome = Some(outcome);
        });

        result
    }

    async fn build_and_upload(&self) -> CoreResult<String> {
        let config = self.ctx.remote_config().await?;

        let now = Utc::now();
        let bytes = {
            let _guard = self.ctx.lock_structure().await;
            let (accounts, zones_by_account) = self.ctx.read_graph().await?;
            if accounts.is_empty() {
                return Err(CoreError::EmptyDataset);
            }
            snapshot::encode(&accounts, &zones_by_account, now)?
        };

        let file_name = naming::file_name(now);
        let path = config.snapshot_path(&file_name);

        self.status.send_modify(|s| s.phase = BackupPhase::Uploading);
        let archive = self.ctx.remote_archive(&config).await?;
        archive.upload(&path, bytes).await?;

        log::info!("[{}] Backup uploaded to {path}", archive.id());
        Ok(file_name)
    }
}

/// Backup coordinator
pub struct BackupService {
    engine: Arc<BackupEngine>,
    events: mpsc::UnboundedSender<MutationEvent>,
}

impl BackupService {
    /// Create the service and the worker that performs automatic backups.
    ///
    /// The worker must be driven with [`BackupWorker::run`]; it stops once the
    /// service is dropped and every queued event has been handled.
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> (Self, BackupWorker) {
        let (status, _) = watch::channel(BackupStatus::default());
        let (events, receiver) = mpsc::unbounded_channel();
        let engine = Arc::new(BackupEngine { ctx, status });

        let worker = BackupWorker {
            engine: engine.clone(),
            events: receiver,
        };
        (Self { engine, events }, worker)
    }

    /// Build a snapshot of every account and zone and upload it.
    ///
    /// Returns the archived file name. Fails with `NoRemoteConfigured` or
    /// `EmptyDataset` before anything is uploaded. Never retried.
    pub async fn backup_now(&self) -> CoreResult<String> {
        self.engine.run().await
    }

    /// Report a successful write.
    ///
    /// Never blocks and never fails; whether a backup follows depends on the
    /// `auto_backup` flag at the time the worker handles the event.
    pub fn on_mutation(&self, event: MutationEvent) {
        if self.events.send(event).is_err() {
            log::warn!("Backup worker has stopped, mutation event discarded");
        }
    }

    /// Current pipeline state
    #[must_use]
    pub fn status(&self) -> BackupStatus {
        self.engine.status.borrow().clone()
    }

    /// Watch pipeline state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BackupStatus> {
        self.engine.status.subscribe()
    }

    /// Remove an archived snapshot.
    pub async fn delete_snapshot(&self, file_name: &str) -> CoreResult<()> {
        if naming::parse(file_name).is_none() {
            return Err(CoreError::ValidationError(format!(
                "'{file_name}' is not a snapshot file name"
            )));
        }
        let ctx = &self.engine.ctx;
        let config = ctx.remote_config().await?;
        let archive = ctx.remote_archive(&config).await?;
        archive
            .delete(&config.snapshot_path(file_name))
            .await
            .map_err(|e| CoreError::from_snapshot_access(e, file_name))?;
        log::info!("[{}] Deleted snapshot {file_name}", archive.id());
        Ok(())
    }
}

/// Consumes mutation events and runs the automatic backups.
pub struct BackupWorker {
    engine: Arc<BackupEngine>,
    events: mpsc::UnboundedReceiver<MutationEvent>,
}

impl BackupWorker {
    /// Handle events until every sender is gone.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle(&event).await;
        }
        log::debug!("Backup worker stopped");
    }

    async fn handle(&self, event: &MutationEvent) {
        let config = match self.engine.ctx.remote_config_repository().load().await {
            Ok(Some(config)) => config,
            Ok(None) => {
                log::debug!("No remote configured, skipping backup for {event:?}");
                return;
            }
            Err(e) => {
                log_failure("Loading remote config", &e);
                return;
            }
        };
        if !config.auto_backup {
            log::debug!("Auto backup disabled, skipping {event:?}");
            return;
        }

        log::debug!("Auto backup triggered by {event:?}");
        if let Err(e) = self.engine.run().await {
            log_failure("Auto backup", &e);
        }
    }
}
