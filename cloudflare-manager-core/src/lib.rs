//! Cloudflare Manager Core Library
//!
//! Keeps the local store of accounts and their zones consistent with a remote
//! snapshot archive:
//! - `AccountService`: per-row account and zone writes
//! - `BackupService` / `BackupWorker`: manual and automatic snapshot uploads
//! - `RestoreService`: transactional full replace from an archived snapshot
//! - `ImportExportService`: the same snapshot document as a local file
//! - `RemoteConfigService`: archive credentials and connection checks
//!
//! Storage is abstracted behind [`LocalStore`] and [`RemoteConfigRepository`];
//! the platform layer injects its implementations through [`ServiceContext`].

pub mod error;
pub mod services;
pub mod snapshot;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{
    ArchiveFactory, ArchiveRegistry, InMemoryArchiveRegistry, LocalStore,
    RemoteConfigRepository, StoreTransaction,
};
