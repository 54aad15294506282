//! In-Memory Backend

use crate::{PredictionRecord, PredictionStore, StorageError};
use async_trait::async_trait;
use std::sync::Mutex;
use survey_data::SurveyMeasurement;
use tracing::{debug, info};

/// Process-local store, mainly for tests and demos
pub struct MemoryStore {
    /// Stored records, in id order
    predictions: Mutex<Vec<PredictionRecord>>,
    /// Next prediction ID
    next_id: Mutex<i64>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        info!("Creating in-memory prediction store");
        Self {
            predictions: Mutex::new(Vec::with_capacity(1000)),
            next_id: Mutex::new(1),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.predictions.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn create_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert(
        &self,
        measurement: &SurveyMeasurement,
        prediction: i64,
        probability: f64,
    ) -> Result<i64, StorageError> {
        let mut predictions = self
            .predictions
            .lock()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;
        let mut next_id = self
            .next_id
            .lock()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;

        let id = *next_id;
        *next_id += 1;
        predictions.push(PredictionRecord::new(id, measurement, prediction, probability));
        debug!("Inserted prediction with ID {}", id);

        Ok(id)
    }

    async fn select_all(&self) -> Result<Vec<PredictionRecord>, StorageError> {
        let predictions = self
            .predictions
            .lock()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;

        Ok(predictions.clone())
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let predictions = self
            .predictions
            .lock()
            .map_err(|e| StorageError::Io(format!("Lock error: {}", e)))?;

        Ok(predictions.len() as i64)
    }
}
