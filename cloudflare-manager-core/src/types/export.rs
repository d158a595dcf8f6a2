//! Import/export and restore result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot rendered for a local file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSnapshot {
    /// Snapshot JSON
    pub content: String,
    /// `cloudflare_backup_<timestamp>.json`
    pub suggested_filename: String,
}

/// What an import would replace the local data with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub version: String,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    pub account_count: usize,
    pub zone_count: usize,
    pub accounts: Vec<ImportPreviewAccount>,
    /// Zones whose owner is missing from the document
    pub orphan_zone_ids: Vec<String>,
}

/// Account summary shown in an import preview (no credentials).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreviewAccount {
    pub account_id: String,
    pub name: String,
    pub zone_count: usize,
    /// An account with the same external id exists locally
    pub exists_locally: bool,
}

/// Outcome of a full replace (restore or import).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub account_count: usize,
    pub zone_count: usize,
    /// Ids of zones skipped because their owner was not in the snapshot
    pub dropped_zones: Vec<String>,
}

/// How a full replace treats zones whose owner is not in the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanZonePolicy {
    /// Skip them and list their ids in the report
    #[default]
    Drop,
    /// Fail with `OrphanZoneOnRestore`, leaving local data untouched
    Reject,
}
