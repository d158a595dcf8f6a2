//! Local file import/export of snapshots

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::services::restore_service::replace_all;
use crate::services::{BackupService, ServiceContext};
use crate::snapshot::{self, naming};
use crate::types::{
    ExportedSnapshot, ImportPreview, ImportPreviewAccount, MutationEvent, RestoreReport,
};

/// Import/export service
///
/// Uses the same document as remote backups, so an exported file can be
/// uploaded by hand and restored, and a downloaded backup can be imported.
pub struct ImportExportService {
    ctx: Arc<ServiceContext>,
    backup: Arc<BackupService>,
}

impl ImportExportService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, backup: Arc<BackupService>) -> Self {
        Self { ctx, backup }
    }

    /// Render every account and zone as a snapshot document.
    pub async fn export_snapshot(&self) -> CoreResult<ExportedSnapshot> {
        let now = Utc::now();
        let bytes = {
            let _guard = self.ctx.lock_structure().await;
            let (accounts, zones_by_account) = self.ctx.read_graph().await?;
            if accounts.is_empty() {
                return Err(CoreError::EmptyDataset);
            }
            snapshot::encode(&accounts, &zones_by_account, now)?
        };

        let content =
            String::from_utf8(bytes).map_err(|e| CoreError::SerializationError(e.to_string()))?;
        Ok(ExportedSnapshot {
            content,
            suggested_filename: naming::file_name(now),
        })
    }

    /// Describe what importing `content` would do, without changing anything.
    pub async fn preview_import(&self, content: &str) -> CoreResult<ImportPreview> {
        let snapshot = snapshot::decode(content.as_bytes())?;
        let local: HashSet<String> = self
            .ctx
            .local_store()
            .list_accounts()
            .await?
            .into_iter()
            .map(|a| a.account_id)
            .collect();

        Ok(ImportPreview {
            version: snapshot.version.to_string(),
            created_at: snapshot.created_at,
            account_count: snapshot.accounts.len(),
            zone_count: snapshot.zone_count(),
            accounts: snapshot
                .accounts
                .iter()
                .map(|a| ImportPreviewAccount {
                    account_id: a.account_id.clone(),
                    name: a.name.clone(),
                    zone_count: a.zones.len(),
                    exists_locally: local.contains(&a.account_id),
                })
                .collect(),
            orphan_zone_ids: snapshot
                .loose_zones
                .iter()
                .map(|z| z.zone.id.clone())
                .collect(),
        })
    }

    /// Replace all local data with `content`; same semantics as a remote restore.
    pub async fn import_snapshot(&self, content: &str) -> CoreResult<RestoreReport> {
        let snapshot = snapshot::decode(content.as_bytes())?;

        let report = {
            let _guard = self.ctx.lock_structure().await;
            replace_all(&self.ctx, &snapshot).await?
        };

        log::info!(
            "Imported {} accounts and {} zones",
            report.account_count,
            report.zone_count
        );
        self.backup.on_mutation(MutationEvent::BulkImport {
            account_count: report.account_count,
        });
        Ok(report)
    }
}
