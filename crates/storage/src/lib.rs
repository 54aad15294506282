//! Storage Layer
//!
//! Persists one row per completed prediction in the `happy_predictions` table.
//! Backends (SQLite file, PostgreSQL, in-memory) implement [`PredictionStore`];
//! [`PredictionLog`] wraps any of them and absorbs failures at the boundary.

mod location;
mod memory;
mod postgres;
mod prediction_log;
mod record;
mod sqlite;
mod store;

pub use location::StoreLocation;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use prediction_log::PredictionLog;
pub use record::PredictionRecord;
pub use sqlite::SqliteStore;
pub use store::{open_store, PredictionStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be created or opened
    #[error("Error initializing database: {0}")]
    Initialization(String),
    /// A save or read failed
    #[error("Database I/O error: {0}")]
    Io(String),
    /// The location string names no known backend
    #[error("Invalid store location: {0}")]
    InvalidLocation(String),
    /// Input rejected before touching the store
    #[error("Invalid record: {0}")]
    Validation(#[from] survey_data::ValidationError),
}
