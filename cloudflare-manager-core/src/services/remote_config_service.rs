//! Remote archive configuration service

use std::sync::Arc;

use cloudflare_manager_archive::WebDavArchive;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{normalize_backup_path, RemoteConfig};

pub struct RemoteConfigService {
    ctx: Arc<ServiceContext>,
}

impl RemoteConfigService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_config(&self) -> CoreResult<Option<RemoteConfig>> {
        self.ctx.remote_config_repository().load().await
    }

    /// Validate, normalise and persist `config`. Cached archive clients are dropped.
    pub async fn save_config(&self, mut config: RemoteConfig) -> CoreResult<RemoteConfig> {
        config.url = config.url.trim().to_string();
        config.username = config.username.trim().to_string();
        config.backup_path = normalize_backup_path(&config.backup_path);

        // Client construction checks the URL scheme and username without any I/O.
        WebDavArchive::new(config.credentials()).map_err(CoreError::from)?;

        self.ctx.remote_config_repository().save(&config).await?;
        self.ctx.archive_registry().clear().await;
        log::info!(
            "Remote archive set to {} (auto backup: {})",
            config.url,
            config.auto_backup
        );
        Ok(config)
    }

    pub async fn clear_config(&self) -> CoreResult<()> {
        self.ctx.remote_config_repository().clear().await?;
        self.ctx.archive_registry().clear().await;
        log::info!("Remote archive configuration cleared");
        Ok(())
    }

    /// Check that the archive accepts the credentials.
    ///
    /// Tests `candidate` when given, the saved configuration otherwise.
    pub async fn test_connection(&self, candidate: Option<&RemoteConfig>) -> CoreResult<()> {
        let config = match candidate {
            Some(config) => config.clone(),
            None => self.ctx.remote_config().await?,
        };
        let archive = self.ctx.remote_archive(&config).await?;
        archive.test_connection().await?;
        Ok(())
    }
}
