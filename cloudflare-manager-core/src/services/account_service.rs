//! Account and zone service
//!
//! Per-row writes used by the front-ends. Every write takes the structural
//! lock, and successful account writes are reported to the backup service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::services::{BackupService, ServiceContext};
use crate::types::{
    Account, CreateAccountRequest, MutationEvent, NewAccount, UpdateAccountRequest, Zone,
    ZoneDraft,
};

/// Account service
pub struct AccountService {
    ctx: Arc<ServiceContext>,
    backup: Arc<BackupService>,
}

impl AccountService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, backup: Arc<BackupService>) -> Self {
        Self { ctx, backup }
    }

    // ===== Accounts =====

    /// All accounts ordered by local id
    pub async fn list_accounts(&self) -> CoreResult<Vec<Account>> {
        self.ctx.local_store().list_accounts().await
    }

    pub async fn get_account(&self, local_id: i64) -> CoreResult<Account> {
        self.ctx
            .local_store()
            .find_account(local_id)
            .await?
            .ok_or(CoreError::AccountNotFound(local_id))
    }

    /// Create an account.
    ///
    /// The first account becomes the default one. The external account id
    /// must not be in use by another local account.
    pub async fn create_account(&self, request: CreateAccountRequest) -> CoreResult<Account> {
        let name = required("name", &request.name)?;
        let account_id = required("account id", &request.account_id)?;
        let api_token = required("API token", &request.api_token)?;

        let account = {
            let _guard = self.ctx.lock_structure().await;
            let store = self.ctx.local_store();

            let existing = store.list_accounts().await?;
            if existing.iter().any(|a| a.account_id == account_id) {
                return Err(CoreError::ValidationError(format!(
                    "account '{account_id}' already exists"
                )));
            }

            let now = Utc::now();
            let new = NewAccount {
                account_id,
                name,
                api_token,
                default_zone_id: blank_to_none(request.default_zone_id),
                r2_access_key_id: blank_to_none(request.r2_access_key_id),
                r2_secret_access_key: blank_to_none(request.r2_secret_access_key),
                is_default: request.is_default || existing.is_empty(),
                created_at: now,
                updated_at: now,
            };
            let local_id = store.insert_account(&new).await?;
            new.into_account(local_id)
        };

        log::info!(
            "Created account {} ({})",
            account.local_id,
            account.account_id
        );
        self.backup.on_mutation(MutationEvent::AccountCreated {
            local_id: account.local_id,
        });
        Ok(account)
    }

    /// Apply the provided fields to an account.
    pub async fn update_account(&self, request: UpdateAccountRequest) -> CoreResult<Account> {
        let account = {
            let _guard = self.ctx.lock_structure().await;
            let mut account = self.get_account(request.local_id).await?;

            if let Some(name) = request.name {
                account.name = required("name", &name)?;
            }
            if let Some(token) = request.api_token {
                account.api_token = required("API token", &token)?;
            }
            if let Some(zone_id) = request.default_zone_id {
                account.default_zone_id = blank_to_none(zone_id);
            }
            if let Some(key_id) = request.r2_access_key_id {
                account.r2_access_key_id = blank_to_none(key_id);
            }
            if let Some(secret) = request.r2_secret_access_key {
                account.r2_secret_access_key = blank_to_none(secret);
            }
            account.updated_at = Utc::now().max(account.updated_at);

            self.ctx.local_store().update_account(&account).await?;
            account
        };

        self.backup.on_mutation(MutationEvent::AccountUpdated {
            local_id: account.local_id,
        });
        Ok(account)
    }

    /// Delete an account and every zone it owns.
    pub async fn delete_account(&self, local_id: i64) -> CoreResult<()> {
        {
            let _guard = self.ctx.lock_structure().await;
            self.ctx.local_store().delete_account(local_id).await?;
        }

        log::info!("Deleted account {local_id}");
        self.backup
            .on_mutation(MutationEvent::AccountDeleted { local_id });
        Ok(())
    }

    /// Make `local_id` the only default account.
    pub async fn set_default_account(&self, local_id: i64) -> CoreResult<()> {
        {
            let _guard = self.ctx.lock_structure().await;
            self.ctx.local_store().set_default_account(local_id).await?;
        }

        self.backup
            .on_mutation(MutationEvent::AccountUpdated { local_id });
        Ok(())
    }

    // ===== Zones =====

    /// Zones of an account, `AccountNotFound` if the account is missing.
    pub async fn list_zones(&self, account_local_id: i64) -> CoreResult<Vec<Zone>> {
        self.get_account(account_local_id).await?;
        self.ctx
            .local_store()
            .list_zones_by_account(account_local_id)
            .await
    }

    /// Make `zone_id` the only selected zone of its account.
    pub async fn select_zone(&self, account_local_id: i64, zone_id: &str) -> CoreResult<()> {
        let _guard = self.ctx.lock_structure().await;
        self.ctx
            .local_store()
            .set_selected_zone(account_local_id, zone_id)
            .await
    }

    /// Replace the cached zones of an account with freshly fetched ones.
    ///
    /// Zones that survive keep their creation time and selection.
    pub async fn sync_zones(
        &self,
        account_local_id: i64,
        drafts: Vec<ZoneDraft>,
    ) -> CoreResult<Vec<Zone>> {
        let mut seen = HashSet::new();
        for draft in &drafts {
            required("zone id", &draft.id)?;
            if !seen.insert(draft.id.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "duplicate zone id '{}'",
                    draft.id
                )));
            }
        }

        let _guard = self.ctx.lock_structure().await;
        self.get_account(account_local_id).await?;

        let mut tx = self.ctx.local_store().begin().await?;
        let previous = tx.list_zones_by_account(account_local_id).await?;
        tx.delete_zones_by_account(account_local_id).await?;

        let now = Utc::now();
        for draft in drafts {
            let old = previous.iter().find(|z| z.id == draft.id);
            let zone = Zone {
                account_local_id,
                name: draft.name,
                status: draft.status,
                zone_type: draft.zone_type,
                paused: draft.paused,
                is_selected: old.is_some_and(|z| z.is_selected),
                created_at: old.map_or(now, |z| z.created_at),
                updated_at: old.map_or(now, |z| now.max(z.updated_at)),
                id: draft.id,
            };
            tx.insert_zone(&zone).await?;
        }

        let zones = tx.list_zones_by_account(account_local_id).await?;
        tx.commit().await?;

        log::debug!(
            "Synced {} zones for account {account_local_id}",
            zones.len()
        );
        Ok(zones)
    }
}

fn required(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BackupWorker;
    use crate::test_utils::{create_test_context, remote_config, MockArchive};

    fn service() -> (
        AccountService,
        BackupWorker,
        Arc<crate::test_utils::MockLocalStore>,
        Arc<crate::test_utils::MockRemoteConfigRepository>,
        Arc<MockArchive>,
    ) {
        let (ctx, store, config_repo, archive) = create_test_context();
        let (backup, worker) = BackupService::new(ctx.clone());
        let svc = AccountService::new(ctx, Arc::new(backup));
        (svc, worker, store, config_repo, archive)
    }

    fn request(account_id: &str, name: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            name: name.to_string(),
            account_id: account_id.to_string(),
            api_token: "token".to_string(),
            default_zone_id: None,
            r2_access_key_id: None,
            r2_secret_access_key: None,
            is_default: false,
        }
    }

    fn drafts(ids: &[&str]) -> Vec<ZoneDraft> {
        ids.iter()
            .map(|id| ZoneDraft {
                id: (*id).to_string(),
                name: format!("{id}.com"),
                status: "active".to_string(),
                zone_type: Some("full".to_string()),
                paused: false,
            })
            .collect()
    }

    #[tokio::test]
    async fn first_account_becomes_default() {
        let (svc, ..) = service();

        let first = svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        let second = svc.create_account(request("acc-2", "Beta")).await.unwrap();

        assert!(first.is_default);
        assert!(!second.is_default);
    }

    #[tokio::test]
    async fn create_validates_input() {
        let (svc, ..) = service();

        let err = svc.create_account(request("acc-1", "  ")).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        let err = svc
            .create_account(request("acc-1", "Again"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn set_default_keeps_a_single_default() {
        let (svc, ..) = service();
        let mut ids = Vec::new();
        for i in 0..4 {
            let account = svc
                .create_account(request(&format!("acc-{i}"), &format!("A{i}")))
                .await
                .unwrap();
            ids.push(account.local_id);
        }

        for &id in ids.iter().rev().chain(ids.iter()) {
            svc.set_default_account(id).await.unwrap();
            let accounts = svc.list_accounts().await.unwrap();
            let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).collect();
            assert_eq!(defaults.len(), 1);
            assert_eq!(defaults[0].local_id, id);
        }
    }

    #[tokio::test]
    async fn set_default_on_missing_account_changes_nothing() {
        let (svc, ..) = service();
        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();

        let err = svc.set_default_account(99).await.unwrap_err();

        assert!(matches!(err, CoreError::AccountNotFound(99)));
        assert!(svc.get_account(alpha.local_id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn update_applies_fields_and_keeps_time_monotonic() {
        let (svc, ..) = service();
        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();

        let updated = svc
            .update_account(UpdateAccountRequest {
                local_id: alpha.local_id,
                name: Some("Alpha 2".to_string()),
                default_zone_id: Some(Some("z1".to_string())),
                ..UpdateAccountRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Alpha 2");
        assert_eq!(updated.api_token, "token");
        assert_eq!(updated.default_zone_id.as_deref(), Some("z1"));
        assert!(updated.updated_at >= alpha.updated_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn delete_cascades_to_zones() {
        let (svc, _worker, store, ..) = service();
        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        svc.sync_zones(alpha.local_id, drafts(&["z1", "z2"]))
            .await
            .unwrap();

        svc.delete_account(alpha.local_id).await.unwrap();

        assert_eq!(store.zone_count().await, 0);
        let err = svc.delete_account(alpha.local_id).await.unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn select_zone_keeps_a_single_selection() {
        let (svc, ..) = service();
        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        svc.sync_zones(alpha.local_id, drafts(&["z1", "z2", "z3"]))
            .await
            .unwrap();

        for id in ["z1", "z3", "z2", "z2"] {
            svc.select_zone(alpha.local_id, id).await.unwrap();
            let zones = svc.list_zones(alpha.local_id).await.unwrap();
            let selected: Vec<_> = zones.iter().filter(|z| z.is_selected).collect();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].id, id);
        }
    }

    #[tokio::test]
    async fn select_zone_of_other_account_fails() {
        let (svc, ..) = service();
        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        let beta = svc.create_account(request("acc-2", "Beta")).await.unwrap();
        svc.sync_zones(alpha.local_id, drafts(&["z1"])).await.unwrap();

        let err = svc.select_zone(beta.local_id, "z1").await.unwrap_err();
        assert!(matches!(err, CoreError::ZoneNotFound(_)));
    }

    #[tokio::test]
    async fn sync_preserves_selection_and_drops_vanished_zones() {
        let (svc, ..) = service();
        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        svc.sync_zones(alpha.local_id, drafts(&["z1", "z2"]))
            .await
            .unwrap();
        svc.select_zone(alpha.local_id, "z2").await.unwrap();

        let zones = svc
            .sync_zones(alpha.local_id, drafts(&["z2", "z3"]))
            .await
            .unwrap();

        let ids: Vec<_> = zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, ["z2", "z3"]);
        assert!(zones.iter().find(|z| z.id == "z2").unwrap().is_selected);
    }

    #[tokio::test]
    async fn sync_for_missing_account_fails() {
        let (svc, ..) = service();
        let err = svc.sync_zones(42, drafts(&["z1"])).await.unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(42)));
    }

    #[tokio::test]
    async fn account_writes_trigger_auto_backup() {
        let (svc, worker, _, config_repo, archive) = service();
        config_repo.set(Some(remote_config(true))).await;

        let alpha = svc.create_account(request("acc-1", "Alpha")).await.unwrap();
        svc.update_account(UpdateAccountRequest {
            local_id: alpha.local_id,
            name: Some("Renamed".to_string()),
            ..UpdateAccountRequest::default()
        })
        .await
        .unwrap();
        svc.sync_zones(alpha.local_id, drafts(&["z1"])).await.unwrap();
        drop(svc);
        worker.run().await;

        // zone sync is not an account mutation
        assert_eq!(archive.upload_count().await, 2);
    }

    #[tokio::test]
    async fn mutation_succeeds_even_when_backup_fails() {
        let (svc, worker, _, config_repo, archive) = service();
        config_repo.set(Some(remote_config(true))).await;
        archive.fail_uploads(true).await;

        let alpha = svc.create_account(request("acc-1", "Alpha")).await;
        drop(svc);
        worker.run().await;

        assert!(alpha.is_ok());
        assert_eq!(archive.upload_count().await, 1);
    }
}
