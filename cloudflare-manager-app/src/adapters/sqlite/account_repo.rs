//! Account queries shared by `SqliteStore` and `SqliteTransaction`.

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder,
};

use cloudflare_manager_core::error::{CoreError, CoreResult};
use cloudflare_manager_core::types::{Account, NewAccount};

use super::entity::account;
use super::{datetime_from_millis, storage_error, zone_repo};

impl account::Model {
    /// Convert a `SeaORM` row model into a domain `Account`.
    fn into_account(self) -> CoreResult<Account> {
        Ok(Account {
            local_id: self.local_id,
            account_id: self.account_id,
            name: self.name,
            api_token: self.api_token,
            default_zone_id: self.default_zone_id,
            r2_access_key_id: self.r2_access_key_id,
            r2_secret_access_key: self.r2_secret_access_key,
            is_default: self.is_default,
            created_at: datetime_from_millis(self.created_at, "created_at")?,
            updated_at: datetime_from_millis(self.updated_at, "updated_at")?,
        })
    }
}

fn new_account_to_active_model(account: &NewAccount) -> account::ActiveModel {
    account::ActiveModel {
        local_id: NotSet,
        account_id: Set(account.account_id.clone()),
        name: Set(account.name.clone()),
        api_token: Set(account.api_token.clone()),
        default_zone_id: Set(account.default_zone_id.clone()),
        r2_access_key_id: Set(account.r2_access_key_id.clone()),
        r2_secret_access_key: Set(account.r2_secret_access_key.clone()),
        is_default: Set(account.is_default),
        created_at: Set(account.created_at.timestamp_millis()),
        updated_at: Set(account
            .updated_at
            .max(account.created_at)
            .timestamp_millis()),
    }
}

pub(super) async fn find<C: ConnectionTrait>(
    conn: &C,
    local_id: i64,
) -> CoreResult<Option<Account>> {
    account::Entity::find_by_id(local_id)
        .one(conn)
        .await
        .map_err(storage_error("query account"))?
        .map(account::Model::into_account)
        .transpose()
}

pub(super) async fn list<C: ConnectionTrait>(conn: &C) -> CoreResult<Vec<Account>> {
    account::Entity::find()
        .order_by_asc(account::Column::LocalId)
        .all(conn)
        .await
        .map_err(storage_error("query accounts"))?
        .into_iter()
        .map(account::Model::into_account)
        .collect()
}

async fn clear_default<C: ConnectionTrait>(conn: &C) -> CoreResult<()> {
    account::Entity::update_many()
        .set(account::ActiveModel {
            is_default: Set(false),
            ..Default::default()
        })
        .filter(account::Column::IsDefault.eq(true))
        .exec(conn)
        .await
        .map_err(storage_error("clear default account"))?;
    Ok(())
}

/// Insert a row and return the key SQLite assigned to it.
pub(super) async fn insert<C: ConnectionTrait>(conn: &C, account: &NewAccount) -> CoreResult<i64> {
    if account.is_default {
        clear_default(conn).await?;
    }
    let result = account::Entity::insert(new_account_to_active_model(account))
        .exec(conn)
        .await
        .map_err(storage_error("insert account"))?;
    Ok(result.last_insert_id)
}

/// Overwrite every mutable column. `created_at` is kept and `updated_at`
/// never moves backwards.
pub(super) async fn update<C: ConnectionTrait>(conn: &C, account: &Account) -> CoreResult<()> {
    let existing = account::Entity::find_by_id(account.local_id)
        .one(conn)
        .await
        .map_err(storage_error("query account"))?
        .ok_or(CoreError::AccountNotFound(account.local_id))?;

    if account.is_default {
        clear_default(conn).await?;
    }

    let updated_at = account
        .updated_at
        .timestamp_millis()
        .max(existing.updated_at)
        .max(existing.created_at);

    account::ActiveModel {
        local_id: Set(account.local_id),
        account_id: Set(account.account_id.clone()),
        name: Set(account.name.clone()),
        api_token: Set(account.api_token.clone()),
        default_zone_id: Set(account.default_zone_id.clone()),
        r2_access_key_id: Set(account.r2_access_key_id.clone()),
        r2_secret_access_key: Set(account.r2_secret_access_key.clone()),
        is_default: Set(account.is_default),
        created_at: NotSet,
        updated_at: Set(updated_at),
    }
    .update(conn)
    .await
    .map_err(storage_error("update account"))?;
    Ok(())
}

/// Delete an account after its zones.
pub(super) async fn delete<C: ConnectionTrait>(conn: &C, local_id: i64) -> CoreResult<()> {
    zone_repo::delete_by_account(conn, local_id).await?;
    let result = account::Entity::delete_by_id(local_id)
        .exec(conn)
        .await
        .map_err(storage_error("delete account"))?;
    if result.rows_affected == 0 {
        return Err(CoreError::AccountNotFound(local_id));
    }
    Ok(())
}

pub(super) async fn set_default<C: ConnectionTrait>(conn: &C, local_id: i64) -> CoreResult<()> {
    clear_default(conn).await?;
    let result = account::Entity::update_many()
        .set(account::ActiveModel {
            is_default: Set(true),
            ..Default::default()
        })
        .filter(account::Column::LocalId.eq(local_id))
        .exec(conn)
        .await
        .map_err(storage_error("set default account"))?;
    if result.rows_affected == 0 {
        return Err(CoreError::AccountNotFound(local_id));
    }
    Ok(())
}

pub(super) async fn exists<C: ConnectionTrait>(conn: &C, local_id: i64) -> CoreResult<bool> {
    let row = account::Entity::find_by_id(local_id)
        .one(conn)
        .await
        .map_err(storage_error("query account"))?;
    Ok(row.is_some())
}

pub(super) async fn delete_all<C: ConnectionTrait>(conn: &C) -> CoreResult<()> {
    account::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(storage_error("delete accounts"))?;
    Ok(())
}
