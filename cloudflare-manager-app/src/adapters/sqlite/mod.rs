//! SQLite-backed store using `SeaORM`.
//!
//! A single `SqliteStore` implements `LocalStore` and `RemoteConfigRepository`
//! against one local `SQLite` database file.

mod account_repo;
pub(crate) mod entity;
mod migration;
mod remote_config_repo;
mod transaction;
mod zone_repo;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{Database, DatabaseConnection, DbErr, TransactionTrait};
use sea_orm_migration::MigratorTrait;

use cloudflare_manager_core::error::{CoreError, CoreResult};
use cloudflare_manager_core::traits::{LocalStore, StoreTransaction};
use cloudflare_manager_core::types::{Account, NewAccount, Zone};

use migration::Migrator;
use transaction::SqliteTransaction;

/// `SQLite` store for accounts, zones and the remote configuration.
///
/// Foreign keys are enforced, so deleting an account cascades to its zones.
pub struct SqliteStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to SQLite: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        log::info!("SQLite store ready at {}", db_path.display());
        Ok(Self { db })
    }

    async fn begin_txn(&self) -> CoreResult<sea_orm::DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(storage_error("begin transaction"))
    }
}

/// Map a `SeaORM` error to `StorageError`, naming the failed action.
pub(crate) fn storage_error(action: &'static str) -> impl Fn(DbErr) -> CoreError {
    move |e| CoreError::StorageError(format!("Failed to {action}: {e}"))
}

fn datetime_from_millis(millis: i64, field: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| CoreError::SerializationError(format!("Invalid {field}: {millis}")))
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn insert_account(&self, account: &NewAccount) -> CoreResult<i64> {
        let txn = self.begin_txn().await?;
        let local_id = account_repo::insert(&txn, account).await?;
        txn.commit().await.map_err(storage_error("commit account"))?;
        Ok(local_id)
    }

    async fn update_account(&self, account: &Account) -> CoreResult<()> {
        let txn = self.begin_txn().await?;
        account_repo::update(&txn, account).await?;
        txn.commit().await.map_err(storage_error("commit account"))
    }

    async fn delete_account(&self, local_id: i64) -> CoreResult<()> {
        let txn = self.begin_txn().await?;
        account_repo::delete(&txn, local_id).await?;
        txn.commit().await.map_err(storage_error("commit account"))
    }

    async fn set_default_account(&self, local_id: i64) -> CoreResult<()> {
        let txn = self.begin_txn().await?;
        account_repo::set_default(&txn, local_id).await?;
        txn.commit().await.map_err(storage_error("commit account"))
    }

    async fn list_accounts(&self) -> CoreResult<Vec<Account>> {
        account_repo::list(&self.db).await
    }

    async fn find_account(&self, local_id: i64) -> CoreResult<Option<Account>> {
        account_repo::find(&self.db, local_id).await
    }

    async fn insert_zone(&self, zone: &Zone) -> CoreResult<()> {
        let txn = self.begin_txn().await?;
        zone_repo::upsert(&txn, zone).await?;
        txn.commit().await.map_err(storage_error("commit zone"))
    }

    async fn set_selected_zone(&self, account_local_id: i64, zone_id: &str) -> CoreResult<()> {
        let txn = self.begin_txn().await?;
        zone_repo::select(&txn, account_local_id, zone_id).await?;
        txn.commit().await.map_err(storage_error("commit zone"))
    }

    async fn list_zones_by_account(&self, account_local_id: i64) -> CoreResult<Vec<Zone>> {
        zone_repo::list_by_account(&self.db, account_local_id).await
    }

    async fn delete_zones_by_account(&self, account_local_id: i64) -> CoreResult<()> {
        zone_repo::delete_by_account(&self.db, account_local_id).await
    }

    async fn delete_all_zones(&self) -> CoreResult<()> {
        zone_repo::delete_all(&self.db).await
    }

    async fn delete_all_accounts(&self) -> CoreResult<()> {
        account_repo::delete_all(&self.db).await
    }

    async fn begin(&self) -> CoreResult<Box<dyn StoreTransaction>> {
        let txn = self.begin_txn().await?;
        Ok(Box::new(SqliteTransaction { txn }))
    }
}
