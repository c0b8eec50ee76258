use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string_null(Users::FirstName))
                    .col(string_null(Users::LastName))
                    .col(string_null(Users::Email))
                    .col(boolean(Users::Activated).default(true))
                    .col(timestamp(Users::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Users::DeletedAt))
                    .to_owned(),
            )
            .await?;

        // Create locations table
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(pk_auto(Locations::Id))
                    .col(string(Locations::Name))
                    .col(string_null(Locations::Address))
                    .col(string_null(Locations::City))
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Name).unique_key())
                    .col(boolean(Categories::RequireAcceptance).default(false))
                    .col(string_null(Categories::EulaText))
                    .col(boolean(Categories::UseDefaultEula).default(false))
                    .col(boolean(Categories::CheckinEmail).default(false))
                    .to_owned(),
            )
            .await?;

        // Create manufacturers table
        manager
            .create_table(
                Table::create()
                    .table(Manufacturers::Table)
                    .if_not_exists()
                    .col(pk_auto(Manufacturers::Id))
                    .col(string(Manufacturers::Name).unique_key())
                    .col(string_null(Manufacturers::Url))
                    .col(string_null(Manufacturers::SupportEmail))
                    .to_owned(),
            )
            .await?;

        // Create assets table
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(pk_auto(Assets::Id))
                    .col(string(Assets::AssetTag).unique_key())
                    .col(string(Assets::Serial))
                    .col(string_null(Assets::Name))
                    .col(integer(Assets::CategoryId))
                    .col(integer_null(Assets::ManufacturerId))
                    .col(integer_null(Assets::LocationId))
                    .col(integer_null(Assets::AssignedTo))
                    .col(timestamp(Assets::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Assets::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Assets::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_category")
                            .from(Assets::Table, Assets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_manufacturer")
                            .from(Assets::Table, Assets::ManufacturerId)
                            .to(Manufacturers::Table, Manufacturers::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_location")
                            .from(Assets::Table, Assets::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_assigned_user")
                            .from(Assets::Table, Assets::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create licenses table
        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .if_not_exists()
                    .col(pk_auto(Licenses::Id))
                    .col(string(Licenses::Name))
                    .col(string_null(Licenses::ProductKey))
                    .col(integer(Licenses::Seats).default(1))
                    .col(boolean(Licenses::Reassignable).default(true))
                    .col(decimal_null(Licenses::PurchaseCost).decimal_len(16, 4))
                    .col(string_null(Licenses::Notes))
                    .col(integer_null(Licenses::CategoryId))
                    .col(timestamp(Licenses::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Licenses::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_category")
                            .from(Licenses::Table, Licenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create license_seats table
        manager
            .create_table(
                Table::create()
                    .table(LicenseSeats::Table)
                    .if_not_exists()
                    .col(pk_auto(LicenseSeats::Id))
                    .col(integer(LicenseSeats::LicenseId))
                    .col(integer_null(LicenseSeats::AssignedTo))
                    .col(integer_null(LicenseSeats::AssetId))
                    .col(string_null(LicenseSeats::Notes))
                    .col(boolean(LicenseSeats::UnreassignableSeat).default(false))
                    .col(integer_null(LicenseSeats::CreatedBy))
                    .col(timestamp(LicenseSeats::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(LicenseSeats::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(LicenseSeats::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_seat_license")
                            .from(LicenseSeats::Table, LicenseSeats::LicenseId)
                            .to(Licenses::Table, Licenses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_seat_user")
                            .from(LicenseSeats::Table, LicenseSeats::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_seat_asset")
                            .from(LicenseSeats::Table, LicenseSeats::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create action_logs table (append-only audit trail)
        manager
            .create_table(
                Table::create()
                    .table(ActionLogs::Table)
                    .if_not_exists()
                    .col(pk_auto(ActionLogs::Id))
                    .col(string(ActionLogs::ActionType))
                    .col(string(ActionLogs::ItemType))
                    .col(integer(ActionLogs::ItemId))
                    .col(string_null(ActionLogs::TargetType))
                    .col(integer_null(ActionLogs::TargetId))
                    .col(string_null(ActionLogs::Note))
                    .col(integer_null(ActionLogs::CreatedBy))
                    .col(timestamp(ActionLogs::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Create settings table (single row)
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(pk_auto(Settings::Id))
                    .col(string(Settings::SiteName).default("assetrust"))
                    .col(string_null(Settings::AdminCcEmail))
                    .col(boolean(Settings::AdminCcAlways).default(false))
                    .col(string_null(Settings::WebhookEndpoint))
                    .col(string_null(Settings::WebhookChannel))
                    .col(string_null(Settings::DefaultEulaText))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActionLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LicenseSeats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Licenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Manufacturers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Email,
    Activated,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    Address,
    City,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    RequireAcceptance,
    EulaText,
    UseDefaultEula,
    CheckinEmail,
}

#[derive(DeriveIden)]
enum Manufacturers {
    Table,
    Id,
    Name,
    Url,
    SupportEmail,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    AssetTag,
    Serial,
    Name,
    CategoryId,
    ManufacturerId,
    LocationId,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Licenses {
    Table,
    Id,
    Name,
    ProductKey,
    Seats,
    Reassignable,
    PurchaseCost,
    Notes,
    CategoryId,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum LicenseSeats {
    Table,
    Id,
    LicenseId,
    AssignedTo,
    AssetId,
    Notes,
    UnreassignableSeat,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ActionLogs {
    Table,
    Id,
    ActionType,
    ItemType,
    ItemId,
    TargetType,
    TargetId,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    SiteName,
    AdminCcEmail,
    AdminCcAlways,
    WebhookEndpoint,
    WebhookChannel,
    DefaultEulaText,
}
