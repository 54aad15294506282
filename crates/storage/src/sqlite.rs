//! SQLite Backend
//!
//! One connection per operation; the database file and its parent
//! directory are created on first use.

use crate::{PredictionRecord, PredictionStore, StorageError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use survey_data::SurveyMeasurement;
use tracing::{debug, warn};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS happy_predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    city_services INTEGER NOT NULL,
    housing_costs INTEGER NOT NULL,
    school_quality INTEGER NOT NULL,
    local_policies INTEGER NOT NULL,
    maintenance INTEGER NOT NULL,
    social_events INTEGER NOT NULL,
    prediction INTEGER NOT NULL,
    probability REAL NOT NULL
)";

const INSERT: &str = "INSERT INTO happy_predictions (
    city_services, housing_costs, school_quality, local_policies,
    maintenance, social_events, prediction, probability
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_ALL: &str = "SELECT id, city_services, housing_costs, school_quality, local_policies,
    maintenance, social_events, prediction, probability
FROM happy_predictions ORDER BY id";

const COUNT: &str = "SELECT COUNT(*) FROM happy_predictions";

/// SQLite file store
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Create a store for the given database file (nothing is opened yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("cannot create directory {}: {}", parent.display(), e))?;
            }
        }

        let opts = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);

        SqliteConnection::connect_with(&opts)
            .await
            .map_err(|e| format!("cannot open {}: {}", self.path.display(), e))
    }
}

async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close SQLite connection: {}", e);
    }
}

#[async_trait]
impl PredictionStore for SqliteStore {
    fn describe(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    async fn create_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Initialization)?;
        let outcome = sqlx::query(CREATE_TABLE).execute(&mut conn).await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Initialization(e.to_string()))?;
        debug!("Ensured table happy_predictions at {}", self.path.display());
        Ok(())
    }

    async fn insert(
        &self,
        measurement: &SurveyMeasurement,
        prediction: i64,
        probability: f64,
    ) -> Result<i64, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Io)?;
        let outcome = async {
            sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
            let result = sqlx::query(INSERT)
                .bind(measurement.city_services)
                .bind(measurement.housing_costs)
                .bind(measurement.school_quality)
                .bind(measurement.local_policies)
                .bind(measurement.maintenance)
                .bind(measurement.social_events)
                .bind(prediction)
                .bind(probability)
                .execute(&mut conn)
                .await?;
            Ok::<_, sqlx::Error>(result.last_insert_rowid())
        }
        .await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn select_all(&self) -> Result<Vec<PredictionRecord>, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Io)?;
        let outcome = async {
            sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
            sqlx::query_as::<_, PredictionRecord>(SELECT_ALL)
                .fetch_all(&mut conn)
                .await
        }
        .await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Io)?;
        let outcome = async {
            sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
            sqlx::query_scalar::<_, i64>(COUNT).fetch_one(&mut conn).await
        }
        .await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement() -> SurveyMeasurement {
        SurveyMeasurement {
            city_services: 3,
            housing_costs: 2,
            school_quality: 4,
            local_policies: 5,
            maintenance: 1,
            social_events: 3,
        }
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("predictions.db");
        let store = SqliteStore::new(&path);

        store.create_schema().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("predictions.db"));
        store.create_schema().await.unwrap();

        let first = store.insert(&measurement(), 0, 0.6).await.unwrap();
        let second = store.insert(&measurement(), 1, 0.7).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let records = store.select_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].measurement(), measurement());
        assert_eq!(records[1].prediction, 1);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_external_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");
        let store = SqliteStore::new(&path);
        store.insert(&measurement(), 1, 0.9).await.unwrap();
        let last = store.insert(&measurement(), 1, 0.9).await.unwrap();

        let opts = SqliteConnectOptions::new().filename(&path);
        let mut conn = SqliteConnection::connect_with(&opts).await.unwrap();
        sqlx::query("DELETE FROM happy_predictions WHERE id = ?1")
            .bind(last)
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();

        let next = store.insert(&measurement(), 1, 0.9).await.unwrap();
        assert!(next > last);
    }

    #[tokio::test]
    async fn test_select_creates_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("fresh.db"));
        assert!(store.select_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_on_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("fresh.db"));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
