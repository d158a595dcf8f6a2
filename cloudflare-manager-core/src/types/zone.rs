//! Zone type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Cloudflare zone cached locally under its owning account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Cloudflare zone id (primary key, kept across restore)
    pub id: String,
    /// Owning account's `local_id`
    pub account_local_id: i64,
    pub name: String,
    pub status: String,
    /// `full`, `partial`, ... as reported by Cloudflare
    #[serde(rename = "type")]
    pub zone_type: Option<String>,
    pub paused: bool,
    /// At most one zone per account is selected
    pub is_selected: bool,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Zone as fetched from the provider, before it is bound to an account.
///
/// Input of `AccountService::sync_zones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDraft {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "type", default)]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub paused: bool,
}
