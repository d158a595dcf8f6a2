//! Remote configuration persistence Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::RemoteConfig;

/// Stores the single [`RemoteConfig`] row.
#[async_trait]
pub trait RemoteConfigRepository: Send + Sync {
    /// `None` when nothing has been configured.
    async fn load(&self) -> CoreResult<Option<RemoteConfig>>;

    /// Replace the stored configuration.
    async fn save(&self, config: &RemoteConfig) -> CoreResult<()>;

    /// Remove the stored configuration (no-op when absent).
    async fn clear(&self) -> CoreResult<()>;
}
