//! Local relational store abstraction

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Account, NewAccount, Zone};

/// Account/zone storage Trait
///
/// Every method is atomic on its own. Multi-step rewrites go through
/// [`LocalStore::begin`].
///
/// Invariants every implementation upholds:
/// - at most one account has `is_default == true`
/// - at most one zone per account has `is_selected == true`
/// - a zone always references an existing account
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Insert an account and return its freshly assigned `local_id`.
    ///
    /// If `account.is_default`, every other account loses the flag.
    async fn insert_account(&self, account: &NewAccount) -> CoreResult<i64>;

    /// Overwrite an existing account by `local_id`.
    ///
    /// Fails with `AccountNotFound` when the row is missing. If `is_default`,
    /// every other account loses the flag.
    async fn update_account(&self, account: &Account) -> CoreResult<()>;

    /// Delete an account together with all zones it owns.
    ///
    /// Fails with `AccountNotFound` when the row is missing.
    async fn delete_account(&self, local_id: i64) -> CoreResult<()>;

    /// Clear the default flag everywhere and set it on `local_id`, in one step.
    async fn set_default_account(&self, local_id: i64) -> CoreResult<()>;

    /// All accounts ordered by `local_id`
    async fn list_accounts(&self) -> CoreResult<Vec<Account>>;

    async fn find_account(&self, local_id: i64) -> CoreResult<Option<Account>>;

    /// Insert or replace a zone by id.
    ///
    /// Fails with `ReferentialIntegrityViolation` when the owner is missing.
    /// A selected zone deselects its siblings.
    async fn insert_zone(&self, zone: &Zone) -> CoreResult<()>;

    /// Select one zone of an account, deselecting its siblings first.
    ///
    /// Fails with `ZoneNotFound` when the account does not own `zone_id`.
    async fn set_selected_zone(&self, account_local_id: i64, zone_id: &str) -> CoreResult<()>;

    /// Zones of one account ordered by name
    async fn list_zones_by_account(&self, account_local_id: i64) -> CoreResult<Vec<Zone>>;

    async fn delete_zones_by_account(&self, account_local_id: i64) -> CoreResult<()>;

    async fn delete_all_zones(&self) -> CoreResult<()>;

    async fn delete_all_accounts(&self) -> CoreResult<()>;

    /// Start a unit of work.
    ///
    /// Writes made through the returned handle become visible only after
    /// [`StoreTransaction::commit`]; dropping it uncommitted rolls them back.
    async fn begin(&self) -> CoreResult<Box<dyn StoreTransaction>>;
}

/// Unit of work over a [`LocalStore`].
///
/// Same per-call semantics as the matching `LocalStore` methods.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn delete_all_zones(&mut self) -> CoreResult<()>;

    async fn delete_all_accounts(&mut self) -> CoreResult<()>;

    async fn delete_zones_by_account(&mut self, account_local_id: i64) -> CoreResult<()>;

    async fn insert_account(&mut self, account: &NewAccount) -> CoreResult<i64>;

    async fn insert_zone(&mut self, zone: &Zone) -> CoreResult<()>;

    async fn list_zones_by_account(&mut self, account_local_id: i64) -> CoreResult<Vec<Zone>>;

    /// Make every write of this transaction durable.
    async fn commit(self: Box<Self>) -> CoreResult<()>;
}
