//! On-disk snapshot JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level snapshot document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotDocument {
    pub version: String,
    #[serde(with = "crate::utils::datetime")]
    pub backup_date: DateTime<Utc>,
    pub accounts: Vec<AccountRecord>,
    /// Version 1.0 only: zones listed beside the accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountRecord {
    pub name: String,
    pub account_id: String,
    pub token: String,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub r2_access_key_id: Option<String>,
    #[serde(default)]
    pub r2_secret_access_key: Option<String>,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Absent in version 1.0 documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZoneRecord {
    pub id: String,
    /// 1.1: owner's local id (informational). 1.0: owner's external id.
    #[serde(default)]
    pub account_id: Option<OwnerRef>,
    pub name: String,
    pub status: String,
    #[serde(rename = "type", default)]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::utils::datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Zone owner reference; writers disagree on whether it is a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum OwnerRef {
    Local(i64),
    External(String),
}

impl OwnerRef {
    pub fn as_external_id(&self) -> String {
        match self {
            Self::Local(id) => id.to_string(),
            Self::External(id) => id.clone(),
        }
    }
}
