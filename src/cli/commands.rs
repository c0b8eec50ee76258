pub mod initdb;
pub mod seed_demo;
pub mod serve;

pub use initdb::init_database;
pub use seed_demo::seed_demo;
pub use serve::serve;
