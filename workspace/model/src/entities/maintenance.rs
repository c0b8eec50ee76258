use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum MaintenanceType {
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "repair")]
    Repair,
    #[sea_orm(string_value = "upgrade")]
    Upgrade,
}

/// A maintenance, repair, or upgrade record for an asset.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "maintenances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub asset_id: i32,
    pub maintenance_type: MaintenanceType,
    pub name: String,
    pub start_date: Date,
    pub completion_date: Option<Date>,
    #[sea_orm(default_value = "false")]
    pub is_warranty: bool,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id"
    )]
    Asset,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
