//! Backup events and status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successful write that may trigger an automatic backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationEvent {
    AccountCreated { local_id: i64 },
    AccountUpdated { local_id: i64 },
    AccountDeleted { local_id: i64 },
    BulkImport { account_count: usize },
}

/// Where the backup pipeline currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackupPhase {
    #[default]
    Idle,
    BuildingSnapshot,
    Uploading,
}

/// Result of the most recent finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum BackupOutcome {
    Succeeded {
        file_name: String,
        #[serde(with = "crate::utils::datetime")]
        at: DateTime<Utc>,
    },
    Failed {
        reason: String,
        #[serde(with = "crate::utils::datetime")]
        at: DateTime<Utc>,
    },
}

/// Observable state of the backup pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    pub phase: BackupPhase,
    pub last_outcome: Option<BackupOutcome>,
    /// Attempts started since the process began
    pub attempts: u64,
}
