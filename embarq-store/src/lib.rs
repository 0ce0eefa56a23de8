pub mod app_config;
pub mod database;
pub mod memory;
pub mod reservation_repo;
pub mod trip_repo;

pub use database::DbClient;
pub use reservation_repo::PgSeatLedger;
pub use trip_repo::PgTripDirectory;
