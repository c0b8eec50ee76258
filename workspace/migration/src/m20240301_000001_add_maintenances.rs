use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Maintenances::Table)
                    .if_not_exists()
                    .col(pk_auto(Maintenances::Id))
                    .col(integer(Maintenances::AssetId))
                    .col(string(Maintenances::MaintenanceType))
                    .col(string(Maintenances::Name))
                    .col(date(Maintenances::StartDate))
                    .col(date_null(Maintenances::CompletionDate))
                    .col(boolean(Maintenances::IsWarranty).default(false))
                    .col(decimal_null(Maintenances::Cost).decimal_len(16, 4))
                    .col(string_null(Maintenances::Notes))
                    .col(integer_null(Maintenances::CreatedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_asset")
                            .from(Maintenances::Table, Maintenances::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Maintenances::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Maintenances {
    Table,
    Id,
    AssetId,
    MaintenanceType,
    Name,
    StartDate,
    CompletionDate,
    IsWarranty,
    Cost,
    Notes,
    CreatedBy,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
}
