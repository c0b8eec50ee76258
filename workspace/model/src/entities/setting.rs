use sea_orm::entity::prelude::*;

/// Site-wide settings. A single row, created on first access.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_name: String,
    /// Additional recipient for checkout notifications.
    pub admin_cc_email: Option<String>,
    /// CC the admin address even when no acceptance is required.
    #[sea_orm(default_value = "false")]
    pub admin_cc_always: bool,
    pub webhook_endpoint: Option<String>,
    pub webhook_channel: Option<String>,
    /// Site-wide EULA used by categories with `use_default_eula`.
    pub default_eula_text: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
