//! Remote archive client registry

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use cloudflare_manager_archive::{create_archive, ArchiveCredentials, RemoteArchiveStore};

use crate::error::CoreResult;

/// Builds an archive client from credentials.
pub type ArchiveFactory = Arc<
    dyn Fn(ArchiveCredentials) -> cloudflare_manager_archive::Result<Arc<dyn RemoteArchiveStore>>
        + Send
        + Sync,
>;

/// Archive client registry Trait
///
/// Hands out a client for the current credentials, reusing the previous one
/// when the credentials have not changed.
#[async_trait]
pub trait ArchiveRegistry: Send + Sync {
    /// Client for `credentials`, built on first use.
    async fn get_or_create(
        &self,
        credentials: &ArchiveCredentials,
    ) -> CoreResult<Arc<dyn RemoteArchiveStore>>;

    /// Drop every cached client.
    async fn clear(&self);
}

/// Single-slot in-memory registry
///
/// Holds at most one client, keyed by a SHA-256 fingerprint of
/// `(url, username, password)`. A lookup with different credentials replaces it.
#[derive(Clone)]
pub struct InMemoryArchiveRegistry {
    factory: ArchiveFactory,
    slot: Arc<RwLock<Option<(String, Arc<dyn RemoteArchiveStore>)>>>,
}

impl InMemoryArchiveRegistry {
    /// Registry building real clients with [`create_archive`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(Arc::new(create_archive))
    }

    /// Registry with a custom client factory
    #[must_use]
    pub fn with_factory(factory: ArchiveFactory) -> Self {
        Self {
            factory,
            slot: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for InMemoryArchiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveRegistry for InMemoryArchiveRegistry {
    async fn get_or_create(
        &self,
        credentials: &ArchiveCredentials,
    ) -> CoreResult<Arc<dyn RemoteArchiveStore>> {
        let key = fingerprint(credentials);

        if let Some((cached_key, archive)) = self.slot.read().await.as_ref() {
            if *cached_key == key {
                return Ok(archive.clone());
            }
        }

        let mut slot = self.slot.write().await;
        if let Some((cached_key, archive)) = slot.as_ref() {
            if *cached_key == key {
                return Ok(archive.clone());
            }
        }

        log::debug!("Creating archive client for {}", credentials.base_url);
        let archive = (self.factory)(credentials.clone())?;
        *slot = Some((key, archive.clone()));
        Ok(archive)
    }

    async fn clear(&self) {
        self.slot.write().await.take();
    }
}

/// Hex SHA-256 over the credential fields, NUL-separated.
fn fingerprint(credentials: &ArchiveCredentials) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credentials.base_url.as_bytes());
    hasher.update([0]);
    hasher.update(credentials.username.as_bytes());
    hasher.update([0]);
    hasher.update(credentials.password.as_bytes());
    hex::encode(hasher.finalize())
}
