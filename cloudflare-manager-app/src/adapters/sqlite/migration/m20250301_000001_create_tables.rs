use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // accounts: AUTOINCREMENT keeps deleted local ids from coming back
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::LocalId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Account::AccountId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Account::Name).string().not_null())
                    .col(ColumnDef::new(Account::ApiToken).string().not_null())
                    .col(ColumnDef::new(Account::DefaultZoneId).string().null())
                    .col(ColumnDef::new(Account::R2AccessKeyId).string().null())
                    .col(ColumnDef::new(Account::R2SecretAccessKey).string().null())
                    .col(
                        ColumnDef::new(Account::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Account::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Account::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // zones
        manager
            .create_table(
                Table::create()
                    .table(Zone::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Zone::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Zone::AccountLocalId).integer().not_null())
                    .col(ColumnDef::new(Zone::Name).string().not_null())
                    .col(ColumnDef::new(Zone::Status).string().not_null())
                    .col(ColumnDef::new(Zone::ZoneType).string().null())
                    .col(
                        ColumnDef::new(Zone::Paused)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Zone::IsSelected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Zone::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Zone::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_zones_account_local_id")
                            .from(Zone::Table, Zone::AccountLocalId)
                            .to(Account::Table, Account::LocalId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_zones_account_local_id")
                    .table(Zone::Table)
                    .col(Zone::AccountLocalId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // remote_config: single row
        manager
            .create_table(
                Table::create()
                    .table(RemoteConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RemoteConfig::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RemoteConfig::Url).string().not_null())
                    .col(ColumnDef::new(RemoteConfig::Username).string().not_null())
                    .col(ColumnDef::new(RemoteConfig::Password).string().not_null())
                    .col(ColumnDef::new(RemoteConfig::BackupPath).string().not_null())
                    .col(
                        ColumnDef::new(RemoteConfig::AutoBackup)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RemoteConfig::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RemoteConfig::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Zone::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    LocalId,
    AccountId,
    Name,
    ApiToken,
    DefaultZoneId,
    R2AccessKeyId,
    R2SecretAccessKey,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Zone {
    #[sea_orm(iden = "zones")]
    Table,
    Id,
    AccountLocalId,
    Name,
    Status,
    ZoneType,
    Paused,
    IsSelected,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RemoteConfig {
    #[sea_orm(iden = "remote_config")]
    Table,
    Id,
    Url,
    Username,
    Password,
    BackupPath,
    AutoBackup,
    UpdatedAt,
}
