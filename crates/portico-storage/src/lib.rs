//! Portico Storage Layer
//!
//! SQLite-backed persistence for the small amount of client state that has
//! to survive a restart. Values live in a single key-value `settings` table.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
