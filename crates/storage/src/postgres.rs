//! PostgreSQL Backend

use crate::{PredictionRecord, PredictionStore, StorageError, StoreLocation};
use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use survey_data::SurveyMeasurement;
use tracing::{debug, warn};

const CREATE_SEQUENCE: &str = "CREATE SEQUENCE IF NOT EXISTS seq_id START 1";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS happy_predictions (
    id BIGINT PRIMARY KEY DEFAULT nextval('seq_id'),
    city_services BIGINT NOT NULL,
    housing_costs BIGINT NOT NULL,
    school_quality BIGINT NOT NULL,
    local_policies BIGINT NOT NULL,
    maintenance BIGINT NOT NULL,
    social_events BIGINT NOT NULL,
    prediction BIGINT NOT NULL,
    probability DOUBLE PRECISION NOT NULL
)";

const INSERT: &str = "INSERT INTO happy_predictions (
    city_services, housing_costs, school_quality, local_policies,
    maintenance, social_events, prediction, probability
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING id";

const SELECT_ALL: &str = "SELECT id, city_services, housing_costs, school_quality, local_policies,
    maintenance, social_events, prediction, probability
FROM happy_predictions ORDER BY id";

const COUNT: &str = "SELECT COUNT(*) FROM happy_predictions";

/// SQLSTATEs raised when another session creates the same objects first:
/// unique_violation (on pg_type / pg_class), duplicate_table, duplicate_object
const CONCURRENT_CREATE_CODES: [&str; 3] = ["23505", "42P07", "42710"];

/// PostgreSQL store addressed by connection URL
pub struct PostgresStore {
    url: String,
}

impl PostgresStore {
    /// Create a store for the given URL (nothing is opened yet)
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn connect(&self) -> Result<PgConnection, String> {
        PgConnection::connect(&self.url)
            .await
            .map_err(|e| format!("cannot connect to {}: {}", self.describe(), e))
    }
}

async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close PostgreSQL connection: {}", e);
    }
}

/// Sequence and table in one transaction
async fn create_objects(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let mut tx = conn.begin().await?;
    sqlx::query(CREATE_SEQUENCE).execute(&mut *tx).await?;
    sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
    tx.commit().await
}

/// `IF NOT EXISTS` is not atomic across sessions: a concurrent creator can
/// win the race, in which case the objects exist and the error is dropped.
async fn ensure_schema(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    match create_objects(conn).await {
        Err(sqlx::Error::Database(e)) if is_concurrent_create(e.code().as_deref()) => {
            debug!("Schema created concurrently by another session: {}", e);
            Ok(())
        }
        other => other,
    }
}

fn is_concurrent_create(code: Option<&str>) -> bool {
    code.map_or(false, |c| CONCURRENT_CREATE_CODES.contains(&c))
}

#[async_trait]
impl PredictionStore for PostgresStore {
    fn describe(&self) -> String {
        StoreLocation::Postgres(self.url.clone()).to_string()
    }

    async fn create_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Initialization)?;
        let outcome = ensure_schema(&mut conn).await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Initialization(e.to_string()))?;
        debug!("Ensured sequence seq_id and table happy_predictions");
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
            ensure_schema(&mut conn).await?;
            sqlx::query_scalar::<_, i64>(INSERT)
                .bind(measurement.city_services)
                .bind(measurement.housing_costs)
                .bind(measurement.school_quality)
                .bind(measurement.local_policies)
                .bind(measurement.maintenance)
                .bind(measurement.social_events)
                .bind(prediction)
                .bind(probability)
                .fetch_one(&mut conn)
                .await
        }
        .await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn select_all(&self) -> Result<Vec<PredictionRecord>, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Io)?;
        let outcome = async {
            ensure_schema(&mut conn).await?;
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
            ensure_schema(&mut conn).await?;
            sqlx::query_scalar::<_, i64>(COUNT).fetch_one(&mut conn).await
        }
        .await;
        release(conn).await;

        outcome.map_err(|e| StorageError::Io(e.to_string()))
    }
}
