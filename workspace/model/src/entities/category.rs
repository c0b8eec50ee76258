use sea_orm::entity::prelude::*;

/// An asset or license category. EULA text and the acceptance requirement
/// live here and apply to every item in the category.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// When true, checkouts of items in this category prompt the recipient
    /// to accept the terms of use.
    #[sea_orm(default_value = "false")]
    pub require_acceptance: bool,
    pub eula_text: Option<String>,
    /// Fall back to the site-wide EULA from settings instead of `eula_text`.
    #[sea_orm(default_value = "false")]
    pub use_default_eula: bool,
    #[sea_orm(default_value = "false")]
    pub checkin_email: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::asset::Entity")]
    Asset,
    #[sea_orm(has_many = "super::license::Entity")]
    License,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::License.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
