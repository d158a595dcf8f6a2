//! Snapshot codec
//!
//! Converts between the local account/zone graph and the versioned JSON
//! document stored on the remote archive. Zones are grouped under the
//! external `accountId` of their owner, never under the local surrogate key.

mod document;
pub mod naming;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{
    Account, LooseZone, Snapshot, SnapshotAccount, SnapshotVersion, SnapshotZone, Zone,
};

use document::{AccountRecord, OwnerRef, SnapshotDocument, ZoneRecord};

/// Serialize accounts and their zones as a current-version document.
///
/// Accounts keep the order they are given in; zones of an account missing
/// from `zones_by_account` encode as an empty list.
pub fn encode(
    accounts: &[Account],
    zones_by_account: &HashMap<i64, Vec<Zone>>,
    created_at: DateTime<Utc>,
) -> CoreResult<Vec<u8>> {
    let document = SnapshotDocument {
        version: SnapshotVersion::CURRENT.as_str().to_string(),
        backup_date: created_at,
        accounts: accounts
            .iter()
            .map(|account| {
                let zones = zones_by_account
                    .get(&account.local_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                account_record(account, zones)
            })
            .collect(),
        zones: None,
    };

    serde_json::to_vec_pretty(&document).map_err(|e| CoreError::SerializationError(e.to_string()))
}

/// Parse and validate a snapshot document.
///
/// Fails with `MalformedSnapshot` on invalid JSON, an unknown version, missing
/// required fields, a blank `accountId`, or duplicate account/zone ids.
pub fn decode(bytes: &[u8]) -> CoreResult<Snapshot> {
    let document: SnapshotDocument =
        serde_json::from_slice(bytes).map_err(|e| malformed(format!("invalid document: {e}")))?;

    let version = SnapshotVersion::parse(&document.version)
        .ok_or_else(|| malformed(format!("unsupported version '{}'", document.version)))?;
    let backup_date = document.backup_date;

    let mut seen_accounts = HashSet::new();
    let mut seen_zones = HashSet::new();
    let mut accounts = Vec::with_capacity(document.accounts.len());

    for record in document.accounts {
        if record.account_id.trim().is_empty() {
            return Err(malformed(format!(
                "account '{}' has an empty accountId",
                record.name
            )));
        }
        if !seen_accounts.insert(record.account_id.clone()) {
            return Err(malformed(format!(
                "duplicate accountId '{}'",
                record.account_id
            )));
        }

        let zones = record
            .zones
            .unwrap_or_default()
            .into_iter()
            .map(|zone| snapshot_zone(zone, backup_date, &mut seen_zones))
            .collect::<CoreResult<Vec<_>>>()?;

        let created_at = record.created_at.unwrap_or(backup_date);
        accounts.push(SnapshotAccount {
            account_id: record.account_id,
            name: record.name,
            api_token: record.token,
            default_zone_id: record.zone_id,
            r2_access_key_id: record.r2_access_key_id,
            r2_secret_access_key: record.r2_secret_access_key,
            is_default: record.is_default,
            created_at,
            updated_at: record.updated_at.unwrap_or(created_at),
            zones,
        });
    }

    let mut loose_zones = Vec::new();
    match (version, document.zones) {
        (SnapshotVersion::V1_0, Some(flat)) => {
            let index: HashMap<String, usize> = accounts
                .iter()
                .enumerate()
                .map(|(i, a)| (a.account_id.clone(), i))
                .collect();

            for record in flat {
                let owner = record
                    .account_id
                    .as_ref()
                    .map(OwnerRef::as_external_id)
                    .ok_or_else(|| malformed(format!("zone '{}' has no accountId", record.id)))?;
                let zone = snapshot_zone(record, backup_date, &mut seen_zones)?;
                match index.get(&owner) {
                    Some(&i) => accounts[i].zones.push(zone),
                    None => loose_zones.push(LooseZone {
                        owner_account_id: owner,
                        zone,
                    }),
                }
            }
        }
        (SnapshotVersion::V1_1, Some(flat)) if !flat.is_empty() => {
            return Err(malformed(
                "version 1.1 documents embed zones under their account".to_string(),
            ));
        }
        _ => {}
    }

    Ok(Snapshot {
        version,
        created_at: backup_date,
        accounts,
        loose_zones,
    })
}

fn account_record(account: &Account, zones: &[Zone]) -> AccountRecord {
    AccountRecord {
        name: account.name.clone(),
        account_id: account.account_id.clone(),
        token: account.api_token.clone(),
        zone_id: account.default_zone_id.clone(),
        is_default: account.is_default,
        r2_access_key_id: account.r2_access_key_id.clone(),
        r2_secret_access_key: account.r2_secret_access_key.clone(),
        created_at: Some(account.created_at),
        updated_at: Some(account.updated_at),
        zones: Some(zones.iter().map(zone_record).collect()),
    }
}

fn zone_record(zone: &Zone) -> ZoneRecord {
    ZoneRecord {
        id: zone.id.clone(),
        account_id: Some(OwnerRef::Local(zone.account_local_id)),
        name: zone.name.clone(),
        status: zone.status.clone(),
        zone_type: zone.zone_type.clone(),
        paused: zone.paused,
        is_selected: zone.is_selected,
        created_at: Some(zone.created_at),
        updated_at: Some(zone.updated_at),
    }
}

fn snapshot_zone(
    record: ZoneRecord,
    backup_date: DateTime<Utc>,
    seen: &mut HashSet<String>,
) -> CoreResult<SnapshotZone> {
    if record.id.trim().is_empty() {
        return Err(malformed(format!("zone '{}' has an empty id", record.name)));
    }
    if !seen.insert(record.id.clone()) {
        return Err(malformed(format!("duplicate zone id '{}'", record.id)));
    }
    let created_at = record.created_at.unwrap_or(backup_date);
    Ok(SnapshotZone {
        id: record.id,
        name: record.name,
        status: record.status,
        zone_type: record.zone_type,
        paused: record.paused,
        is_selected: record.is_selected,
        created_at,
        updated_at: record.updated_at.unwrap_or(created_at),
    })
}

fn malformed(detail: String) -> CoreError {
    CoreError::MalformedSnapshot(detail)
}
