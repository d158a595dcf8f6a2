//! # cloudflare-manager-archive
//!
//! Remote archive abstraction used by Cloudflare Manager to store account snapshots.
//!
//! The archive is a plain file store reachable over HTTP with Basic authentication.
//! [`RemoteArchiveStore`] describes the five operations the backup engine needs
//! (connection test, upload, download, list, delete); [`WebDavArchive`] implements them
//! against any WebDAV server (Nextcloud, ownCloud, Apache `mod_dav`, ...).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cloudflare_manager_archive::{create_archive, ArchiveCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let archive = create_archive(ArchiveCredentials::new(
//!         "https://dav.example.com/remote.php/webdav",
//!         "alice",
//!         "app-password",
//!     ))?;
//!
//!     archive.test_connection().await?;
//!     archive
//!         .upload("/cloudflare-manager/hello.json", b"{}".to_vec())
//!         .await?;
//!     for name in archive.list("/cloudflare-manager/").await? {
//!         println!("{name}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ArchiveError>`](ArchiveError):
//!
//! - [`ArchiveError::InvalidCredentials`]: the server rejected the username/password
//! - [`ArchiveError::NotFound`]: the file does not exist
//! - [`ArchiveError::NetworkError`] / [`ArchiveError::Timeout`] /
//!   [`ArchiveError::ServerError`]: transient, the caller may try again
//!
//! Nothing is retried automatically.

mod error;
mod factory;
mod http_client;
mod traits;
mod types;
mod utils;
mod webdav;

// Re-export error types
pub use error::{ArchiveError, Result};

// Re-export factory function
pub use factory::create_archive;

pub use traits::RemoteArchiveStore;
pub use types::ArchiveCredentials;
pub use webdav::WebDavArchive;
