//! Store Interface

use crate::{
    MemoryStore, PostgresStore, PredictionRecord, SqliteStore, StorageError, StoreLocation,
};
use async_trait::async_trait;
use std::sync::Arc;
use survey_data::SurveyMeasurement;

/// A durable collection of prediction records.
///
/// Each call is a single unit of work: implementations acquire their handle,
/// do the work, and release the handle before returning, on success and on
/// failure. The table is created if absent before any insert or select.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Human-readable location, safe to log
    fn describe(&self) -> String;

    /// Create the table (and any sequence) if missing. Idempotent.
    async fn create_schema(&self) -> Result<(), StorageError>;

    /// Append one record, returning its store-assigned id
    async fn insert(
        &self,
        measurement: &SurveyMeasurement,
        prediction: i64,
        probability: f64,
    ) -> Result<i64, StorageError>;

    /// All records, ascending by id
    async fn select_all(&self) -> Result<Vec<PredictionRecord>, StorageError>;

    /// Number of stored records
    async fn count(&self) -> Result<i64, StorageError>;
}

/// Build the backend for a location
pub fn open_store(location: &StoreLocation) -> Arc<dyn PredictionStore> {
    match location {
        StoreLocation::Sqlite(path) => Arc::new(SqliteStore::new(path.clone())),
        StoreLocation::Postgres(url) => Arc::new(PostgresStore::new(url.clone())),
        StoreLocation::Memory => Arc::new(MemoryStore::new()),
    }
}
