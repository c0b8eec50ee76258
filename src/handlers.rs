pub mod assets;
pub mod categories;
pub mod health;
pub mod licenses;
pub mod locations;
pub mod maintenances;
pub mod manufacturers;
pub mod reports;
pub mod seats;
pub mod settings;
pub mod users;
