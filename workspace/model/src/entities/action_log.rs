use sea_orm::entity::prelude::*;

/// What happened to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ActionType {
    #[sea_orm(string_value = "create")]
    Create,
    #[sea_orm(string_value = "update")]
    Update,
    #[sea_orm(string_value = "delete")]
    Delete,
    #[sea_orm(string_value = "checkout")]
    Checkout,
    #[sea_orm(string_value = "checkin")]
    Checkin,
    #[sea_orm(string_value = "add seats")]
    AddSeats,
}

/// Append-only audit trail entry.
///
/// `item_*` is the subject of the action (the license, the asset);
/// `target_*` is who or what received it on checkout/checkin. Target ids are
/// kept verbatim even when the referenced row has been purged, so the history
/// stays readable.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "action_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub action_type: ActionType,
    pub item_type: String,
    pub item_id: i32,
    pub target_type: Option<String>,
    pub target_id: Option<i32>,
    pub note: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
