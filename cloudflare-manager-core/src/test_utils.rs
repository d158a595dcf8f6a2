//! Test helper module
//!
//! In-memory mocks of every adapter plus factory helpers.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;

use cloudflare_manager_archive::{ArchiveCredentials, ArchiveError, RemoteArchiveStore};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{
    ArchiveFactory, InMemoryArchiveRegistry, LocalStore, RemoteConfigRepository,
    StoreTransaction,
};
use crate::types::{Account, NewAccount, OrphanZonePolicy, RemoteConfig, Zone};

// ===== MockLocalStore =====

#[derive(Clone, Default)]
struct StoreState {
    accounts: BTreeMap<i64, Account>,
    zones: BTreeMap<String, Zone>,
    last_id: i64,
    fail_zone_inserts: bool,
}

impl StoreState {
    fn insert_account(&mut self, new: &NewAccount) -> i64 {
        self.last_id += 1;
        let local_id = self.last_id;
        if new.is_default {
            self.clear_default();
        }
        self.accounts
            .insert(local_id, new.clone().into_account(local_id));
        local_id
    }

    fn update_account(&mut self, account: &Account) -> CoreResult<()> {
        if !self.accounts.contains_key(&account.local_id) {
            return Err(CoreError::AccountNotFound(account.local_id));
        }
        if account.is_default {
            self.clear_default();
        }
        self.accounts.insert(account.local_id, account.clone());
        Ok(())
    }

    fn clear_default(&mut self) {
        for account in self.accounts.values_mut() {
            account.is_default = false;
        }
    }

    fn insert_zone(&mut self, zone: &Zone) -> CoreResult<()> {
        if self.fail_zone_inserts {
            return Err(CoreError::StorageError("zone insert disabled".to_string()));
        }
        if !self.accounts.contains_key(&zone.account_local_id) {
            return Err(CoreError::ReferentialIntegrityViolation {
                zone_id: zone.id.clone(),
                account_local_id: zone.account_local_id,
            });
        }
        if zone.is_selected {
            self.clear_selection(zone.account_local_id);
        }
        self.zones.insert(zone.id.clone(), zone.clone());
        Ok(())
    }

    fn clear_selection(&mut self, account_local_id: i64) {
        for zone in self.zones.values_mut() {
            if zone.account_local_id == account_local_id {
                zone.is_selected = false;
            }
        }
    }

    fn zones_of(&self, account_local_id: i64) -> Vec<Zone> {
        let mut zones: Vec<Zone> = self
            .zones
            .values()
            .filter(|z| z.account_local_id == account_local_id)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        zones
    }

    fn delete_zones_of(&mut self, account_local_id: i64) {
        self.zones.retain(|_, z| z.account_local_id != account_local_id);
    }
}

/// In-memory `LocalStore`; transactions work on a copy swapped in on commit.
#[derive(Default)]
pub struct MockLocalStore {
    state: Arc<RwLock<StoreState>>,
}

impl MockLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every zone insert fail with `StorageError`.
    pub async fn fail_zone_inserts(&self, fail: bool) {
        self.state.write().await.fail_zone_inserts = fail;
    }

    pub async fn account_count(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    pub async fn zone_count(&self) -> usize {
        self.state.read().await.zones.len()
    }
}

#[async_trait]
impl LocalStore for MockLocalStore {
    async fn insert_account(&self, account: &NewAccount) -> CoreResult<i64> {
        Ok(self.state.write().await.insert_account(account))
    }

    async fn update_account(&self, account: &Account) -> CoreResult<()> {
        self.state.write().await.update_account(account)
    }

    async fn delete_account(&self, local_id: i64) -> CoreResult<()> {
        let mut state = self.state.write().await;
        if state.accounts.remove(&local_id).is_none() {
            return Err(CoreError::AccountNotFound(local_id));
        }
        state.delete_zones_of(local_id);
        Ok(())
    }

    async fn set_default_account(&self, local_id: i64) -> CoreResult<()> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&local_id) {
            return Err(CoreError::AccountNotFound(local_id));
        }
        state.clear_default();
        if let Some(account) = state.accounts.get_mut(&local_id) {
            account.is_default = true;
        }
        Ok(())
    }

    async fn list_accounts(&self) -> CoreResult<Vec<Account>> {
        Ok(self.state.read().await.accounts.values().cloned().collect())
    }

    async fn find_account(&self, local_id: i64) -> CoreResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(&local_id).cloned())
    }

    async fn insert_zone(&self, zone: &Zone) -> CoreResult<()> {
        self.state.write().await.insert_zone(zone)
    }

    async fn set_selected_zone(&self, account_local_id: i64, zone_id: &str) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let owned = state
            .zones
            .get(zone_id)
            .is_some_and(|z| z.account_local_id == account_local_id);
        if !owned {
            return Err(CoreError::ZoneNotFound(zone_id.to_string()));
        }
        state.clear_selection(account_local_id);
        if let Some(zone) = state.zones.get_mut(zone_id) {
            zone.is_selected = true;
        }
        Ok(())
    }

    async fn list_zones_by_account(&self, account_local_id: i64) -> CoreResult<Vec<Zone>> {
        Ok(self.state.read().await.zones_of(account_local_id))
    }

    async fn delete_zones_by_account(&self, account_local_id: i64) -> CoreResult<()> {
        self.state.write().await.delete_zones_of(account_local_id);
        Ok(())
    }

    async fn delete_all_zones(&self) -> CoreResult<()> {
        self.state.write().await.zones.clear();
        Ok(())
    }

    async fn delete_all_accounts(&self) -> CoreResult<()> {
        let mut state = self.state.write().await;
        state.accounts.clear();
        state.zones.clear();
        Ok(())
    }

    async fn begin(&self) -> CoreResult<Box<dyn StoreTransaction>> {
        let working = self.state.read().await.clone();
        Ok(Box::new(MockTransaction {
            target: self.state.clone(),
            working,
        }))
    }
}

struct MockTransaction {
    target: Arc<RwLock<StoreState>>,
    working: StoreState,
}

#[async_trait]
impl StoreTransaction for MockTransaction {
    async fn delete_all_zones(&mut self) -> CoreResult<()> {
        self.working.zones.clear();
        Ok(())
    }

    async fn delete_all_accounts(&mut self) -> CoreResult<()> {
        if !self.working.zones.is_empty() {
            return Err(CoreError::StorageError(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        self.working.accounts.clear();
        Ok(())
    }

    async fn delete_zones_by_account(&mut self, account_local_id: i64) -> CoreResult<()> {
        self.working.delete_zones_of(account_local_id);
        Ok(())
    }

    async fn insert_account(&mut self, account: &NewAccount) -> CoreResult<i64> {
        Ok(self.working.insert_account(account))
    }

    async fn insert_zone(&mut self, zone: &Zone) -> CoreResult<()> {
        self.working.insert_zone(zone)
    }

    async fn list_zones_by_account(&mut self, account_local_id: i64) -> CoreResult<Vec<Zone>> {
        Ok(self.working.zones_of(account_local_id))
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let mut target = self.target.write().await;
        let fail_zone_inserts = target.fail_zone_inserts;
        *target = self.working;
        target.fail_zone_inserts = fail_zone_inserts;
        Ok(())
    }
}

// ===== MockRemoteConfigRepository =====

#[derive(Default)]
pub struct MockRemoteConfigRepository {
    config: RwLock<Option<RemoteConfig>>,
}

impl MockRemoteConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, config: Option<RemoteConfig>) {
        *self.config.write().await = config;
    }
}

#[async_trait]
impl RemoteConfigRepository for MockRemoteConfigRepository {
    async fn load(&self) -> CoreResult<Option<RemoteConfig>> {
        Ok(self.config.read().await.clone())
    }

    async fn save(&self, config: &RemoteConfig) -> CoreResult<()> {
        *self.config.write().await = Some(config.clone());
        Ok(())
    }

    async fn clear(&self) -> CoreResult<()> {
        *self.config.write().await = None;
        Ok(())
    }
}

// ===== MockArchive =====

/// In-memory archive that records every upload attempt.
#[derive(Default)]
pub struct MockArchive {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    uploads: RwLock<Vec<String>>,
    fail_uploads: RwLock<bool>,
    connection_ok: RwLock<bool>,
    base_missing: RwLock<bool>,
}

impl MockArchive {
    pub fn new() -> Self {
        Self {
            connection_ok: RwLock::new(true),
            ..Self::default()
        }
    }

    pub async fn fail_uploads(&self, fail: bool) {
        *self.fail_uploads.write().await = fail;
    }

    pub async fn reject_credentials(&self) {
        *self.connection_ok.write().await = false;
    }

    /// Answer 404 for the base collection, like a server behind a wrong URL.
    pub async fn lose_base_collection(&self) {
        *self.base_missing.write().await = true;
    }

    async fn check_base(&self, path: &str) -> cloudflare_manager_archive::Result<()> {
        if *self.base_missing.read().await {
            return Err(ArchiveError::NotFound {
                backend: "mock".to_string(),
                path: path.to_string(),
            });
        }
        Ok(())
    }

    pub async fn put_file(&self, path: &str, bytes: &[u8]) {
        self.files
            .write()
            .await
            .insert(path.to_string(), bytes.to_vec());
    }

    pub async fn files(&self) -> Vec<String> {
        self.files.read().await.keys().cloned().collect()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    pub async fn uploaded_paths(&self) -> Vec<String> {
        self.uploads.read().await.clone()
    }
}

#[async_trait]
impl RemoteArchiveStore for MockArchive {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn test_connection(&self) -> cloudflare_manager_archive::Result<()> {
        self.check_base("/").await?;
        if *self.connection_ok.read().await {
            Ok(())
        } else {
            Err(ArchiveError::InvalidCredentials {
                backend: "mock".to_string(),
                raw_message: None,
            })
        }
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> cloudflare_manager_archive::Result<()> {
        self.uploads.write().await.push(path.to_string());
        self.check_base(path).await?;
        if *self.fail_uploads.read().await {
            return Err(ArchiveError::NetworkError {
                backend: "mock".to_string(),
                detail: "connection reset".to_string(),
            });
        }
        self.files.write().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn download(&self, path: &str) -> cloudflare_manager_archive::Result<Vec<u8>> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| ArchiveError::NotFound {
                backend: "mock".to_string(),
                path: path.to_string(),
            })
    }

    async fn list(&self, prefix: &str) -> cloudflare_manager_archive::Result<Vec<String>> {
        Ok(self
            .files
            .read()
            .await
            .keys()
            .filter_map(|path| path.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect())
    }

    async fn delete(&self, path: &str) -> cloudflare_manager_archive::Result<()> {
        match self.files.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(ArchiveError::NotFound {
                backend: "mock".to_string(),
                path: path.to_string(),
            }),
        }
    }
}

// ===== Factory methods =====

/// Create a `ServiceContext` wired to fresh mocks.
pub fn create_test_context() -> (
    Arc<ServiceContext>,
    Arc<MockLocalStore>,
    Arc<MockRemoteConfigRepository>,
    Arc<MockArchive>,
) {
    create_test_context_with_policy(OrphanZonePolicy::default())
}

pub fn create_test_context_with_policy(
    policy: OrphanZonePolicy,
) -> (
    Arc<ServiceContext>,
    Arc<MockLocalStore>,
    Arc<MockRemoteConfigRepository>,
    Arc<MockArchive>,
) {
    let store = Arc::new(MockLocalStore::new());
    let config_repo = Arc::new(MockRemoteConfigRepository::new());
    let archive = Arc::new(MockArchive::new());

    let registry = InMemoryArchiveRegistry::with_factory(mock_factory(archive.clone()));

    let ctx = Arc::new(ServiceContext::new(
        store.clone(),
        config_repo.clone(),
        Arc::new(registry),
        policy,
    ));

    (ctx, store, config_repo, archive)
}

/// Factory handing out the same mock archive for any credentials.
pub fn mock_factory(archive: Arc<MockArchive>) -> ArchiveFactory {
    Arc::new(
        move |_: ArchiveCredentials| -> cloudflare_manager_archive::Result<Arc<dyn RemoteArchiveStore>> {
            Ok(archive.clone())
        },
    )
}

/// Remote config pointing at `/backups/`.
pub fn remote_config(auto_backup: bool) -> RemoteConfig {
    RemoteConfig::new("https://dav.example.com/dav", "user", "pass")
        .with_backup_path("/backups")
        .with_auto_backup(auto_backup)
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn sample_account(local_id: i64, account_id: &str, name: &str) -> Account {
    new_account(account_id, name).into_account(local_id)
}

pub fn new_account(account_id: &str, name: &str) -> NewAccount {
    NewAccount {
        account_id: account_id.to_string(),
        name: name.to_string(),
        api_token: format!("token-{account_id}"),
        default_zone_id: None,
        r2_access_key_id: None,
        r2_secret_access_key: None,
        is_default: false,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn sample_zone(id: &str, account_local_id: i64, name: &str) -> Zone {
    Zone {
        id: id.to_string(),
        account_local_id,
        name: name.to_string(),
        status: "active".to_string(),
        zone_type: Some("full".to_string()),
        paused: false,
        is_selected: false,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Insert an account straight into the store and return its local id.
pub async fn seed_account(ctx: &ServiceContext, account_id: &str, name: &str) -> i64 {
    ctx.local_store()
        .insert_account(&new_account(account_id, name))
        .await
        .unwrap()
}

pub async fn seed_zone(ctx: &ServiceContext, id: &str, owner: i64, name: &str) {
    ctx.local_store()
        .insert_zone(&sample_zone(id, owner, name))
        .await
        .unwrap();
}

/// Legacy document with one zone whose owner is missing.
pub const LEGACY_WITH_ORPHAN: &str = r#"{
    "version": "1.0",
    "backupDate": 1704067200000,
    "accounts": [ { "name": "Alpha", "accountId": "acc-1", "token": "t" } ],
    "zones": [
        { "id": "z-alpha", "accountId": "acc-1", "name": "alpha.com", "status": "active" },
        { "id": "z-orphan", "accountId": "acc-ghost", "name": "ghost.com", "status": "active" }
    ]
}"#;
