use sea_orm::entity::prelude::*;

/// One assignable unit of a license.
///
/// A seat is checked out to either a user (`assigned_to`) or an asset
/// (`asset_id`), never both. `unreassignable_seat` is set permanently when a
/// seat under a non-reassignable license is checked in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "license_seats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub license_id: i32,
    pub assigned_to: Option<i32>,
    pub asset_id: Option<i32>,
    pub notes: Option<String>,
    #[sea_orm(default_value = "false")]
    pub unreassignable_seat: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

impl Model {
    pub fn is_available(&self) -> bool {
        self.assigned_to.is_none() && self.asset_id.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::license::Entity",
        from = "Column::LicenseId",
        to = "super::license::Column::Id"
    )]
    License,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id"
    )]
    Asset,
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::License.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
