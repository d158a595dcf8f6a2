//! Zone queries shared by `SqliteStore` and `SqliteTransaction`.

use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder,
};

use cloudflare_manager_core::error::{CoreError, CoreResult};
use cloudflare_manager_core::types::Zone;

use super::entity::zone;
use super::{account_repo, datetime_from_millis, storage_error};

impl zone::Model {
    fn into_zone(self) -> CoreResult<Zone> {
        Ok(Zone {
            id: self.id,
            account_local_id: self.account_local_id,
            name: self.name,
            status: self.status,
            zone_type: self.zone_type,
            paused: self.paused,
            is_selected: self.is_selected,
            created_at: datetime_from_millis(self.created_at, "created_at")?,
            updated_at: datetime_from_millis(self.updated_at, "updated_at")?,
        })
    }
}

fn zone_to_active_model(zone: &Zone) -> zone::ActiveModel {
    zone::ActiveModel {
        id: Set(zone.id.clone()),
        account_local_id: Set(zone.account_local_id),
        name: Set(zone.name.clone()),
        status: Set(zone.status.clone()),
        zone_type: Set(zone.zone_type.clone()),
        paused: Set(zone.paused),
        is_selected: Set(zone.is_selected),
        created_at: Set(zone.created_at.timestamp_millis()),
        updated_at: Set(zone.updated_at.max(zone.created_at).timestamp_millis()),
    }
}

async fn clear_selection<C: ConnectionTrait>(conn: &C, account_local_id: i64) -> CoreResult<()> {
    zone::Entity::update_many()
        .set(zone::ActiveModel {
            is_selected: Set(false),
            ..Default::default()
        })
        .filter(zone::Column::AccountLocalId.eq(account_local_id))
        .filter(zone::Column::IsSelected.eq(true))
        .exec(conn)
        .await
        .map_err(storage_error("clear zone selection"))?;
    Ok(())
}

/// Upsert by zone id after checking the owner exists.
pub(super) async fn upsert<C: ConnectionTrait>(conn: &C, zone: &Zone) -> CoreResult<()> {
    if !account_repo::exists(conn, zone.account_local_id).await? {
        return Err(CoreError::ReferentialIntegrityViolation {
            zone_id: zone.id.clone(),
            account_local_id: zone.account_local_id,
        });
    }
    if zone.is_selected {
        clear_selection(conn, zone.account_local_id).await?;
    }

    zone::Entity::insert(zone_to_active_model(zone))
        .on_conflict(
            OnConflict::column(zone::Column::Id)
                .update_columns([
                    zone::Column::AccountLocalId,
                    zone::Column::Name,
                    zone::Column::Status,
                    zone::Column::ZoneType,
                    zone::Column::Paused,
                    zone::Column::IsSelected,
                    zone::Column::CreatedAt,
                    zone::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await
        .map_err(storage_error("save zone"))?;
    Ok(())
}

pub(super) async fn select<C: ConnectionTrait>(
    conn: &C,
    account_local_id: i64,
    zone_id: &str,
) -> CoreResult<()> {
    let owned = zone::Entity::find_by_id(zone_id.to_string())
        .filter(zone::Column::AccountLocalId.eq(account_local_id))
        .one(conn)
        .await
        .map_err(storage_error("query zone"))?;
    if owned.is_none() {
        return Err(CoreError::ZoneNotFound(zone_id.to_string()));
    }

    clear_selection(conn, account_local_id).await?;
    zone::Entity::update_many()
        .set(zone::ActiveModel {
            is_selected: Set(true),
            ..Default::default()
        })
        .filter(zone::Column::Id.eq(zone_id))
        .exec(conn)
        .await
        .map_err(storage_error("select zone"))?;
    Ok(())
}

pub(super) async fn list_by_account<C: ConnectionTrait>(
    conn: &C,
    account_local_id: i64,
) -> CoreResult<Vec<Zone>> {
    zone::Entity::find()
        .filter(zone::Column::AccountLocalId.eq(account_local_id))
        .order_by_asc(zone::Column::Name)
        .all(conn)
        .await
        .map_err(storage_error("query zones"))?
        .into_iter()
        .map(zone::Model::into_zone)
        .collect()
}

pub(super) async fn delete_by_account<C: ConnectionTrait>(
    conn: &C,
    account_local_id: i64,
) -> CoreResult<()> {
    zone::Entity::delete_many()
        .filter(zone::Column::AccountLocalId.eq(account_local_id))
        .exec(conn)
        .await
        .map_err(storage_error("delete zones"))?;
    Ok(())
}

pub(super) async fn delete_all<C: ConnectionTrait>(conn: &C) -> CoreResult<()> {
    zone::Entity::delete_many()
        .exec(conn)
        .await
        .map_err(storage_error("delete zones"))?;
    Ok(())
}
