use sea_orm::entity::prelude::*;

/// A person who can own assets and hold license seats.
///
/// Users are soft-deleted: `deleted_at` is set instead of removing the row so
/// historic checkouts keep pointing at a real record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Notification emails are skipped when this is empty.
    pub email: Option<String>,
    #[sea_orm(default_value = "true")]
    pub activated: bool,
    pub created_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

impl Model {
    /// Display name used in mail bodies and log lines.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Assets currently checked out to this user.
    #[sea_orm(has_many = "super::asset::Entity")]
    Asset,
    /// License seats currently assigned to this user.
    #[sea_orm(has_many = "super::license_seat::Entity")]
    LicenseSeat,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::license_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LicenseSeat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
