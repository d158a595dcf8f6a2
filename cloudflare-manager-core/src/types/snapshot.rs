//! Decoded snapshot graph

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{NewAccount, Zone};

/// Snapshot document versions understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapshotVersion {
    /// Flat top-level `zones` list keyed by the owner's external account id
    #[serde(rename = "1.0")]
    V1_0,
    /// Zones embedded under their account
    #[serde(rename = "1.1")]
    V1_1,
}

impl SnapshotVersion {
    /// Version written by `encode`.
    pub const CURRENT: Self = Self::V1_1;

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1.0" => Some(Self::V1_0),
            "1.1" => Some(Self::V1_1),
            _ => None,
        }
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full account/zone graph keyed by external account ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: SnapshotVersion,
    pub created_at: DateTime<Utc>,
    pub accounts: Vec<SnapshotAccount>,
    /// Legacy zones whose owner is not among `accounts`
    pub loose_zones: Vec<LooseZone>,
}

impl Snapshot {
    /// Zones embedded under accounts (loose zones excluded).
    #[must_use]
    pub fn zone_count(&self) -> usize {
        self.accounts.iter().map(|a| a.zones.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotAccount {
    pub account_id: String,
    pub name: String,
    pub api_token: String,
    pub default_zone_id: Option<String>,
    pub r2_access_key_id: Option<String>,
    pub r2_secret_access_key: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub zones: Vec<SnapshotZone>,
}

impl SnapshotAccount {
    /// Row to insert on restore; the store assigns a fresh `local_id`.
    #[must_use]
    pub fn to_new_account(&self) -> NewAccount {
        NewAccount {
            account_id: self.account_id.clone(),
            name: self.name.clone(),
            api_token: self.api_token.clone(),
            default_zone_id: self.default_zone_id.clone(),
            r2_access_key_id: self.r2_access_key_id.clone(),
            r2_secret_access_key: self.r2_secret_access_key.clone(),
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at.max(self.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotZone {
    pub id: String,
    pub name: String,
    pub status: String,
    pub zone_type: Option<String>,
    pub paused: bool,
    pub is_selected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SnapshotZone {
    /// Bind the zone to its re-resolved owner.
    #[must_use]
    pub fn to_zone(&self, account_local_id: i64) -> Zone {
        Zone {
            id: self.id.clone(),
            account_local_id,
            name: self.name.clone(),
            status: self.status.clone(),
            zone_type: self.zone_type.clone(),
            paused: self.paused,
            is_selected: self.is_selected,
            created_at: self.created_at,
            updated_at: self.updated_at.max(self.created_at),
        }
    }
}

/// Zone from a legacy document whose owner is missing from the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseZone {
    /// External account id the zone claims as owner
    pub owner_account_id: String,
    pub zone: SnapshotZone,
}
