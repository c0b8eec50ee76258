use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A software license with a fixed number of assignable seats.
///
/// When `reassignable` is false a seat that gets checked in is burned: it is
/// flagged unreassignable and can never be handed out again.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub product_key: Option<String>,
    /// Number of seat rows provisioned for this license.
    #[sea_orm(default_value = "1")]
    pub seats: i32,
    #[sea_orm(default_value = "true")]
    pub reassignable: bool,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub purchase_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
    pub created_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::license_seat::Entity")]
    LicenseSeat,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::license_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LicenseSeat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
