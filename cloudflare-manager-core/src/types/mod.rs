//! Type definitions

mod account;
mod backup;
mod export;
mod remote_config;
mod snapshot;
mod zone;

pub use account::{Account, CreateAccountRequest, NewAccount, UpdateAccountRequest};
pub use backup::{BackupOutcome, BackupPhase, BackupStatus, MutationEvent};
pub use export::{
    ExportedSnapshot, ImportPreview, ImportPreviewAccount, OrphanZonePolicy, RestoreReport,
};
pub use remote_config::{normalize_backup_path, RemoteConfig, DEFAULT_BACKUP_PATH};
pub use snapshot::{LooseZone, Snapshot, SnapshotAccount, SnapshotVersion, SnapshotZone};
pub use zone::{Zone, ZoneDraft};
