//! Restore from the remote archive

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::snapshot::{self, naming};
use crate::types::{OrphanZonePolicy, RestoreReport, Snapshot};

/// Restore coordinator
pub struct RestoreService {
    ctx: Arc<ServiceContext>,
}

impl RestoreService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Snapshot files in the backup directory, most recent first.
    ///
    /// Files that do not follow the snapshot naming scheme are ignored.
    pub async fn list_available_snapshots(&self) -> CoreResult<Vec<String>> {
        let config = self.ctx.remote_config().await?;
        let archive = self.ctx.remote_archive(&config).await?;
        let names = archive.list(&config.backup_path).await?;
        Ok(naming::sort_newest_first(names))
    }

    /// Replace every local account and zone with the content of `file_name`.
    ///
    /// Runs as one transaction: on any failure the local data is left exactly
    /// as it was. Accounts receive fresh local ids; zones are re-linked through
    /// their owner's external account id.
    pub async fn restore(&self, file_name: &str) -> CoreResult<RestoreReport> {
        if file_name.trim().is_empty() || file_name.contains('/') {
            return Err(CoreError::ValidationError(format!(
                "invalid snapshot file name '{file_name}'"
            )));
        }

        let config = self.ctx.remote_config().await?;
        let archive = self.ctx.remote_archive(&config).await?;
        let bytes = archive
            .download(&config.snapshot_path(file_name))
            .await
            .map_err(|e| CoreError::from_snapshot_access(e, file_name))?;
        let snapshot = snapshot::decode(&bytes)?;

        let report = {
            let _guard = self.ctx.lock_structure().await;
            replace_all(&self.ctx, &snapshot).await?
        };

        log::info!(
            "[{}] Restored {} accounts and {} zones from {file_name}",
            archive.id(),
            report.account_count,
            report.zone_count
        );
        if !report.dropped_zones.is_empty() {
            log::warn!(
                "Dropped {} zones without an owner: {:?}",
                report.dropped_zones.len(),
                report.dropped_zones
            );
        }
        Ok(report)
    }
}

/// Full replace of the local graph by `snapshot`. Callers hold the structural lock.
pub(crate) async fn replace_all(
    ctx: &ServiceContext,
    snapshot: &Snapshot,
) -> CoreResult<RestoreReport> {
    if ctx.orphan_zone_policy() == OrphanZonePolicy::Reject {
        if let Some(orphan) = snapshot.loose_zones.first() {
            return Err(CoreError::OrphanZoneOnRestore {
                zone_id: orphan.zone.id.clone(),
                account_id: orphan.owner_account_id.clone(),
            });
        }
    }

    let mut tx = ctx.local_store().begin().await?;

    // Zones first: they reference accounts.
    tx.delete_all_zones().await?;
    tx.delete_all_accounts().await?;

    let mut local_ids: HashMap<&str, i64> = HashMap::with_capacity(snapshot.accounts.len());
    for account in &snapshot.accounts {
        let local_id = tx.insert_account(&account.to_new_account()).await?;
        local_ids.insert(account.account_id.as_str(), local_id);
    }

    let mut zone_count = 0;
    for account in &snapshot.accounts {
        let Some(&owner) = local_ids.get(account.account_id.as_str()) else {
            continue;
        };
        for zone in &account.zones {
            tx.insert_zone(&zone.to_zone(owner)).await?;
            zone_count += 1;
        }
    }

    let dropped_zones = snapshot
        .loose_zones
        .iter()
        .map(|loose| loose.zone.id.clone())
        .collect();

    tx.commit().await?;

    Ok(RestoreReport {
        account_count: snapshot.accounts.len(),
        zone_count,
        dropped_zones,
    })
}
