pub mod cache;
pub mod migrations;
pub mod models;

pub use cache::SqliteCache;
pub use models::*;
