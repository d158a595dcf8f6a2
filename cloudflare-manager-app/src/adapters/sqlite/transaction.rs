//! `StoreTransaction` over a `SeaORM` database transaction.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;

use cloudflare_manager_core::error::CoreResult;
use cloudflare_manager_core::traits::StoreTransaction;
use cloudflare_manager_core::types::{NewAccount, Zone};

use super::{account_repo, storage_error, zone_repo};

/// Open SQLite transaction; `SeaORM` rolls it back when dropped uncommitted.
pub(super) struct SqliteTransaction {
    pub(super) txn: DatabaseTransaction,
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn delete_all_zones(&mut self) -> CoreResult<()> {
        zone_repo::delete_all(&self.txn).await
    }

    async fn delete_all_accounts(&mut self) -> CoreResult<()> {
        account_repo::delete_all(&self.txn).await
    }

    async fn delete_zones_by_account(&mut self, account_local_id: i64) -> CoreResult<()> {
        zone_repo::delete_by_account(&self.txn, account_local_id).await
    }

    async fn insert_account(&mut self, account: &NewAccount) -> CoreResult<i64> {
        account_repo::insert(&self.txn, account).await
    }

    async fn insert_zone(&mut self, zone: &Zone) -> CoreResult<()> {
        zone_repo::upsert(&self.txn, zone).await
    }

    async fn list_zones_by_account(&mut self, account_local_id: i64) -> CoreResult<Vec<Zone>> {
        zone_repo::list_by_account(&self.txn, account_local_id).await
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        self.txn
            .commit()
            .await
            .map_err(storage_error("commit transaction"))
    }
}
