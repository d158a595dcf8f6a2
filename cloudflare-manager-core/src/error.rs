//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use cloudflare_manager_archive::ArchiveError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// No remote archive credentials have been saved
    #[error("No remote archive configured")]
    NoRemoteConfigured,

    /// Transport-level failure talking to the remote archive
    #[error("Network error: {0}")]
    NetworkFailure(String),

    /// The remote archive rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    /// Snapshot could not be decoded (invalid JSON, unknown version, missing fields)
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Nothing to back up
    #[error("No accounts to back up")]
    EmptyDataset,

    /// A zone references an account that does not exist
    #[error("Zone {zone_id} references missing account {account_local_id}")]
    ReferentialIntegrityViolation {
        zone_id: String,
        account_local_id: i64,
    },

    /// A zone in a snapshot has no matching account in the same snapshot
    #[error("Zone {zone_id} in snapshot references unknown account {account_id}")]
    OrphanZoneOnRestore { zone_id: String, account_id: String },

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    /// Zone not found
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Snapshot file not found on the remote archive
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Any other remote archive failure (unexpected status, unparsable listing)
    #[error("Remote archive error: {0}")]
    RemoteError(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NoRemoteConfigured
            | Self::AuthenticationFailure(_)
            | Self::MalformedSnapshot(_)
            | Self::EmptyDataset
            | Self::OrphanZoneOnRestore { .. }
            | Self::AccountNotFound(_)
            | Self::ZoneNotFound(_)
            | Self::SnapshotNotFound(_)
            | Self::ValidationError(_) => true,
            Self::NetworkFailure(_)
            | Self::ReferentialIntegrityViolation { .. }
            | Self::StorageError(_)
            | Self::SerializationError(_)
            | Self::RemoteError(_) => false,
        }
    }

    /// Archive failure while reading or removing the snapshot `file_name`.
    ///
    /// Only here does a 404 mean the snapshot is missing; anywhere else it
    /// points at a wrong base URL or backup directory.
    pub(crate) fn from_snapshot_access(err: ArchiveError, file_name: &str) -> Self {
        match err {
            ArchiveError::NotFound { .. } => Self::SnapshotNotFound(file_name.to_string()),
            other => other.into(),
        }
    }
}

impl From<ArchiveError> for CoreError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::NetworkError { .. }
            | ArchiveError::Timeout { .. }
            | ArchiveError::ServerError { .. } => Self::NetworkFailure(err.to_string()),
            ArchiveError::InvalidCredentials { .. } | ArchiveError::PermissionDenied { .. } => {
                Self::AuthenticationFailure(err.to_string())
            }
            ArchiveError::InvalidConfiguration { detail, .. } => Self::ValidationError(detail),
            ArchiveError::NotFound { .. }
            | ArchiveError::ParseError { .. }
            | ArchiveError::Unknown { .. } => Self::RemoteError(err.to_string()),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
