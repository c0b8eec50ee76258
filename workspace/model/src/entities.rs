//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the asset management application here:
//! hardware assets, software licenses and their seats, the people and
//! places they are checked out to, and the audit trail tying it together.

pub mod action_log;
pub mod asset;
pub mod category;
pub mod license;
pub mod license_seat;
pub mod location;
pub mod maintenance;
pub mod manufacturer;
pub mod setting;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::action_log::Entity as ActionLog;
    pub use super::asset::Entity as Asset;
    pub use super::category::Entity as Category;
    pub use super::license::Entity as License;
    pub use super::license_seat::Entity as LicenseSeat;
    pub use super::location::Entity as Location;
    pub use super::maintenance::Entity as Maintenance;
    pub use super::manufacturer::Entity as Manufacturer;
    pub use super::setting::Entity as Setting;
    pub use super::user::Entity as User;
}
