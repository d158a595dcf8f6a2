#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `SqliteStore`: covers the `LocalStore`,
//! `StoreTransaction` and `RemoteConfigRepository` implementations.

use chrono::{DateTime, Duration, Utc};

use cloudflare_manager_app::adapters::SqliteStore;
use cloudflare_manager_core::error::CoreError;
use cloudflare_manager_core::traits::{LocalStore, RemoteConfigRepository};
use cloudflare_manager_core::types::{NewAccount, RemoteConfig, Zone};

// ===== Helpers =====

async fn create_test_store() -> (SqliteStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = tmp.path().join("nested").join("test.db");
    let store = SqliteStore::new(&db_path)
        .await
        .expect("failed to create SqliteStore");
    (store, tmp)
}

fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_123).unwrap()
}

fn make_account(account_id: &str, is_default: bool) -> NewAccount {
    NewAccount {
        account_id: account_id.to_string(),
        name: format!("Account {account_id}"),
        api_token: format!("token-{account_id}"),
        default_zone_id: None,
        r2_access_key_id: Some("r2-key".to_string()),
        r2_secret_access_key: None,
        is_default,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

fn make_zone(id: &str, owner: i64, name: &str, is_selected: bool) -> Zone {
    Zone {
        id: id.to_string(),
        account_local_id: owner,
        name: name.to_string(),
        status: "active".to_string(),
        zone_type: Some("full".to_string()),
        paused: false,
        is_selected,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

async fn default_count(store: &SqliteStore) -> usize {
    store
        .list_accounts()
        .await
        .unwrap()
        .iter()
        .filter(|a| a.is_default)
        .count()
}

// ===== Accounts =====

#[tokio::test]
async fn account_insert_and_find_round_trip() {
    let (store, _tmp) = create_test_store().await;

    let new = make_account("acc-1", false);
    let local_id = store.insert_account(&new).await.unwrap();

    let found = store.find_account(local_id).await.unwrap().unwrap();
    assert_eq!(found, new.into_account(local_id));
    assert!(store.find_account(local_id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn accounts_are_listed_by_local_id() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-b", false)).await.unwrap();
    let b = store.insert_account(&make_account("acc-a", false)).await.unwrap();

    let ids: Vec<i64> = store
        .list_accounts()
        .await
        .unwrap()
        .iter()
        .map(|a| a.local_id)
        .collect();
    assert_eq!(ids, vec![a, b]);
}

#[tokio::test]
async fn duplicate_external_account_id_is_rejected() {
    let (store, _tmp) = create_test_store().await;
    store.insert_account(&make_account("acc-1", false)).await.unwrap();

    let err = store
        .insert_account(&make_account("acc-1", false))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::StorageError(_)));
}

#[tokio::test]
async fn inserting_default_account_clears_previous_default() {
    let (store, _tmp) = create_test_store().await;
    let first = store.insert_account(&make_account("acc-1", true)).await.unwrap();
    let second = store.insert_account(&make_account("acc-2", true)).await.unwrap();

    assert_eq!(default_count(&store).await, 1);
    assert!(!store.find_account(first).await.unwrap().unwrap().is_default);
    assert!(store.find_account(second).await.unwrap().unwrap().is_default);
}

#[tokio::test]
async fn set_default_account_moves_flag() {
    let (store, _tmp) = create_test_store().await;
    let first = store.insert_account(&make_account("acc-1", true)).await.unwrap();
    let second = store.insert_account(&make_account("acc-2", false)).await.unwrap();

    store.set_default_account(second).await.unwrap();

    assert_eq!(default_count(&store).await, 1);
    assert!(!store.find_account(first).await.unwrap().unwrap().is_default);
    assert!(store.find_account(second).await.unwrap().unwrap().is_default);
}

#[tokio::test]
async fn set_default_on_missing_account_keeps_current_default() {
    let (store, _tmp) = create_test_store().await;
    let first = store.insert_account(&make_account("acc-1", true)).await.unwrap();

    let err = store.set_default_account(first + 10).await.unwrap_err();

    assert!(matches!(err, CoreError::AccountNotFound(_)));
    assert!(store.find_account(first).await.unwrap().unwrap().is_default);
}

#[tokio::test]
async fn update_account_overwrites_fields() {
    let (store, _tmp) = create_test_store().await;
    let local_id = store.insert_account(&make_account("acc-1", false)).await.unwrap();

    let mut account = store.find_account(local_id).await.unwrap().unwrap();
    account.name = "Renamed".to_string();
    account.default_zone_id = Some("z1".to_string());
    account.updated_at = fixed_time() + Duration::seconds(5);
    store.update_account(&account).await.unwrap();

    let found = store.find_account(local_id).await.unwrap().unwrap();
    assert_eq!(found, account);
}

#[tokio::test]
async fn update_account_never_moves_updated_at_backwards() {
    let (store, _tmp) = create_test_store().await;
    let local_id = store.insert_account(&make_account("acc-1", false)).await.unwrap();

    let mut account = store.find_account(local_id).await.unwrap().unwrap();
    account.updated_at = fixed_time() - Duration::days(1);
    store.update_account(&account).await.unwrap();

    let found = store.find_account(local_id).await.unwrap().unwrap();
    assert_eq!(found.updated_at, fixed_time());
    assert!(found.updated_at >= found.created_at);
}

#[tokio::test]
async fn update_missing_account_fails() {
    let (store, _tmp) = create_test_store().await;
    let account = make_account("acc-1", false).into_account(42);

    let err = store.update_account(&account).await.unwrap_err();
    assert!(matches!(err, CoreError::AccountNotFound(42)));
}

#[tokio::test]
async fn deleting_account_removes_its_zones() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    let b = store.insert_account(&make_account("acc-2", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", a, "a.com", false)).await.unwrap();
    store.insert_zone(&make_zone("z2", b, "b.com", false)).await.unwrap();

    store.delete_account(a).await.unwrap();

    assert!(store.list_zones_by_account(a).await.unwrap().is_empty());
    assert_eq!(store.list_zones_by_account(b).await.unwrap().len(), 1);
    assert!(matches!(
        store.delete_account(a).await,
        Err(CoreError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn delete_all_accounts_cascades_to_zones() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", a, "a.com", false)).await.unwrap();

    store.delete_all_accounts().await.unwrap();

    assert!(store.list_accounts().await.unwrap().is_empty());
    // Re-inserting the zone id under a new owner proves the old row is gone.
    let c = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", c, "a.com", false)).await.unwrap();
    assert_eq!(store.list_zones_by_account(c).await.unwrap().len(), 1);
}

#[tokio::test]
async fn local_ids_are_not_reused() {
    let (store, _tmp) = create_test_store().await;
    let first = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    let second = store.insert_account(&make_account("acc-2", false)).await.unwrap();

    store.delete_account(second).await.unwrap();
    store.delete_all_accounts().await.unwrap();
    let third = store.insert_account(&make_account("acc-3", false)).await.unwrap();

    assert!(third > second);
    assert!(third > first);
}

// ===== Zones =====

#[tokio::test]
async fn zone_without_owner_is_rejected() {
    let (store, _tmp) = create_test_store().await;

    let err = store
        .insert_zone(&make_zone("z1", 99, "ghost.com", false))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::ReferentialIntegrityViolation {
            account_local_id: 99,
            ..
        }
    ));
}

#[tokio::test]
async fn zones_are_listed_by_name_and_upserted_by_id() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    store.insert_zone(&make_zone("z2", a, "zeta.com", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", a, "alpha.com", false)).await.unwrap();

    let mut renamed = make_zone("z2", a, "beta.com", false);
    renamed.paused = true;
    store.insert_zone(&renamed).await.unwrap();

    let zones = store.list_zones_by_account(a).await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].name, "alpha.com");
    assert_eq!(zones[1], renamed);
}

#[tokio::test]
async fn only_one_zone_per_account_is_selected() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    let b = store.insert_account(&make_account("acc-2", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", a, "one.com", true)).await.unwrap();
    store.insert_zone(&make_zone("z2", a, "two.com", true)).await.unwrap();
    store.insert_zone(&make_zone("z3", b, "three.com", true)).await.unwrap();

    let selected: Vec<String> = store
        .list_zones_by_account(a)
        .await
        .unwrap()
        .into_iter()
        .filter(|z| z.is_selected)
        .map(|z| z.id)
        .collect();
    assert_eq!(selected, vec!["z2".to_string()]);

    store.set_selected_zone(a, "z1").await.unwrap();
    let zones = store.list_zones_by_account(a).await.unwrap();
    assert!(zones[0].is_selected);
    assert!(!zones[1].is_selected);
    // Other accounts keep their own selection.
    assert!(store.list_zones_by_account(b).await.unwrap()[0].is_selected);
}

#[tokio::test]
async fn selecting_foreign_zone_fails() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    let b = store.insert_account(&make_account("acc-2", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", a, "one.com", true)).await.unwrap();

    let err = store.set_selected_zone(b, "z1").await.unwrap_err();

    assert!(matches!(err, CoreError::ZoneNotFound(_)));
    assert!(store.list_zones_by_account(a).await.unwrap()[0].is_selected);
}

#[tokio::test]
async fn delete_zones_by_account_and_all() {
    let (store, _tmp) = create_test_store().await;
    let a = store.insert_account(&make_account("acc-1", false)).await.unwrap();
    let b = store.insert_account(&make_account("acc-2", false)).await.unwrap();
    store.insert_zone(&make_zone("z1", a, "one.com", false)).await.unwrap();
    store.insert_zone(&make_zone("z2", b, "two.com", false)).await.unwrap();

    store.delete_zones_by_account(a).await.unwrap();
    assert!(store.list_zones_by_account(a).await.unwrap().is_empty());
    assert_eq!(store.list_zones_by_account(b).await.unwrap().len(), 1);

    store.delete_all_zones().await.unwrap();
    assert!(store.list_zones_by_account(b).await.unwrap().is_empty());
    assert_eq!(store.list_accounts().await.unwrap().len(), 2);
}

// ===== Transactions =====

#[tokio::test]
async fn committed_transaction_replaces_data() {
    let (store, _tmp) = create_test_store().await;
    let old = store.insert_account(&make_account("acc-old", false)).await.unwrap();
    store.insert_zone(&make_zone("z-old", old, "old.com", false)).await.unwrap();

    let mut txn = store.begin().await.unwrap();
    txn.delete_all_zones().await.unwrap();
    txn.delete_all_accounts().await.unwrap();
    let new = txn.insert_account(&make_account("acc-new", true)).await.unwrap();
    txn.insert_zone(&make_zone("z-new", new, "new.com", true))
        .await
        .unwrap();
    assert_eq!(txn.list_zones_by_account(new).await.unwrap().len(), 1);
    txn.commit().await.unwrap();

    let accounts = store.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_id, "acc-new");
    assert_ne!(accounts[0].local_id, old);
    assert_eq!(store.list_zones_by_account(new).await.unwrap()[0].id, "z-new");
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let (store, _tmp) = create_test_store().await;
    let old = store.insert_account(&make_account("acc-old", true)).await.unwrap();
    store.insert_zone(&make_zone("z-old", old, "old.com", true)).await.unwrap();

    {
        let mut txn = store.begin().await.unwrap();
        txn.delete_all_zones().await.unwrap();
        txn.delete_all_accounts().await.unwrap();
        txn.insert_account(&make_account("acc-new", false))
            .await
            .unwrap();
        let err = txn
            .insert_zone(&make_zone("z-bad", 9_999, "bad.com", false))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ReferentialIntegrityViolation { .. }
        ));
    }

    let accounts = store.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].local_id, old);
    assert!(accounts[0].is_default);
    let zones = store.list_zones_by_account(old).await.unwrap();
    assert_eq!(zones.len(), 1);
    assert!(zones[0].is_selected);
}

// ===== RemoteConfigRepository =====

#[tokio::test]
async fn remote_config_round_trip_and_clear() {
    let (store, _tmp) = create_test_store().await;
    assert!(store.load().await.unwrap().is_none());

    let config = RemoteConfig::new("https://dav.example.com", "user", "secret")
        .with_backup_path("backups")
        .with_auto_backup(true);
    store.save(&config).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(config.clone()));

    let replaced = RemoteConfig::new("https://other.example.com", "u2", "p2");
    store.save(&replaced).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(replaced));

    store.clear().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
    store.clear().await.unwrap();
}

#[tokio::test]
async fn data_survives_reopening_the_database() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("persist.db");

    let local_id = {
        let store = SqliteStore::new(&db_path).await.unwrap();
        let local_id = store.insert_account(&make_account("acc-1", true)).await.unwrap();
        store
            .insert_zone(&make_zone("z1", local_id, "one.com", true))
            .await
            .unwrap();
        local_id
    };

    let store = SqliteStore::new(&db_path).await.unwrap();
    let account = store.find_account(local_id).await.unwrap().unwrap();
    assert_eq!(account.created_at, fixed_time());
    assert_eq!(store.list_zones_by_account(local_id).await.unwrap().len(), 1);
}
