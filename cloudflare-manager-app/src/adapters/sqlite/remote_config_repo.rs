//! `RemoteConfigRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{sea_query::OnConflict, ActiveValue::Set, EntityTrait};

use cloudflare_manager_core::error::CoreResult;
use cloudflare_manager_core::traits::RemoteConfigRepository;
use cloudflare_manager_core::types::RemoteConfig;

use super::entity::remote_config::{self, SINGLETON_ID};
use super::{storage_error, SqliteStore};

impl From<remote_config::Model> for RemoteConfig {
    fn from(model: remote_config::Model) -> Self {
        Self {
            url: model.url,
            username: model.username,
            password: model.password,
            backup_path: model.backup_path,
            auto_backup: model.auto_backup,
        }
    }
}

#[async_trait]
impl RemoteConfigRepository for SqliteStore {
    async fn load(&self) -> CoreResult<Option<RemoteConfig>> {
        let row = remote_config::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(storage_error("query remote config"))?;
        Ok(row.map(RemoteConfig::from))
    }

    async fn save(&self, config: &RemoteConfig) -> CoreResult<()> {
        let active_model = remote_config::ActiveModel {
            id: Set(SINGLETON_ID),
            url: Set(config.url.clone()),
            username: Set(config.username.clone()),
            password: Set(config.password.clone()),
            backup_path: Set(config.backup_path.clone()),
            auto_backup: Set(config.auto_backup),
            updated_at: Set(chrono::Utc::now().timestamp_millis()),
        };

        remote_config::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(remote_config::Column::Id)
                    .update_columns([
                        remote_config::Column::Url,
                        remote_config::Column::Username,
                        remote_config::Column::Password,
                        remote_config::Column::BackupPath,
                        remote_config::Column::AutoBackup,
                        remote_config::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(storage_error("save remote config"))?;
        Ok(())
    }

    async fn clear(&self) -> CoreResult<()> {
        remote_config::Entity::delete_by_id(SINGLETON_ID)
            .exec(&self.db)
            .await
            .map_err(storage_error("delete remote config"))?;
        Ok(())
    }
}
