//! Local SQLite persistence for consumption records and aggregates.

pub mod paths;
pub mod schema;
pub mod store;

pub use paths::AppPaths;
pub use schema::run_migrations;
pub use store::{ConsumptionStore, StoreStats};
