//! Prediction Log
//!
//! Boundary over a [`PredictionStore`]: every failure is logged and
//! absorbed here, so callers only ever see `bool`, `Option`, or an empty
//! vector. An empty result therefore means either "no records yet" or
//! "read failed"; the log tells them apart.

use crate::{open_store, PredictionRecord, PredictionStore, StorageError, StoreLocation};
use std::sync::Arc;
use survey_data::{RatingFields, SurveyMeasurement};
use tracing::{error, info};

/// Prediction persistence with absorbed failures
#[derive(Clone)]
pub struct PredictionLog {
    store: Arc<dyn PredictionStore>,
}

impl PredictionLog {
    /// Wrap an existing backend
    pub fn new(store: Arc<dyn PredictionStore>) -> Self {
        Self { store }
    }

    /// Open the backend for a location
    pub fn open(location: &StoreLocation) -> Self {
        info!("Using prediction store at {}", location);
        Self::new(open_store(location))
    }

    /// Location of the underlying store, safe to log
    pub fn describe(&self) -> String {
        self.store.describe()
    }

    /// Ensure the table exists. Returns `false` if the store cannot be
    /// created or opened.
    pub async fn initialize(&self) -> bool {
        match self.store.create_schema().await {
            Ok(()) => {
                info!("Database initialized successfully!");
                true
            }
            Err(e) => {
                error!("Error initializing database at {}: {}", self.describe(), e);
                false
            }
        }
    }

    /// Save one prediction from a field map.
    ///
    /// A missing rating is rejected before the store is touched. Returns the
    /// assigned id, or `None` if anything failed.
    pub async fn save(
        &self,
        fields: &RatingFields,
        prediction: i64,
        probability: f64,
    ) -> Option<i64> {
        match SurveyMeasurement::from_fields(fields) {
            Ok(measurement) => self.save_measurement(&measurement, prediction, probability).await,
            Err(e) => {
                self.log_save_error(&StorageError::from(e));
                None
            }
        }
    }

    /// Save one prediction from a typed measurement
    pub async fn save_measurement(
        &self,
        measurement: &SurveyMeasurement,
        prediction: i64,
        probability: f64,
    ) -> Option<i64> {
        match self.store.insert(measurement, prediction, probability).await {
            Ok(id) => {
                info!("Data saved to the database successfully! (id={})", id);
                Some(id)
            }
            Err(e) => {
                self.log_save_error(&e);
                None
            }
        }
    }

    /// All stored predictions in id order; empty on failure
    pub async fn load_all(&self) -> Vec<PredictionRecord> {
        match self.store.select_all().await {
            Ok(records) => {
                info!("Data read from the database successfully! ({} rows)", records.len());
                records
            }
            Err(e) => {
                error!("Error reading data from database at {}: {}", self.describe(), e);
                Vec::new()
            }
        }
    }

    /// Number of stored predictions; `None` if the store cannot be read
    pub async fn count(&self) -> Option<i64> {
        match self.store.count().await {
            Ok(n) => Some(n),
            Err(e) => {
                error!("Error reading data from database at {}: {}", self.describe(), e);
                None
            }
        }
    }

    fn log_save_error(&self, e: &StorageError) {
        error!("Error saving data to the database at {}: {}", self.describe(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, SqliteStore};
    use proptest::prelude::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use survey_data::RatingField;

    /// Log lines written while a [`capture_logs`] guard is alive
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Route this thread's events into a buffer until the guard drops
    fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        (capture, tracing::subscriber::set_default(subscriber))
    }

    fn sample_fields() -> RatingFields {
        [
            ("city_services", 8),
            ("housing_costs", 6),
            ("school_quality", 7),
            ("local_policies", 5),
            ("maintenance", 9),
            ("social_events", 4),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn sqlite_log(path: PathBuf) -> PredictionLog {
        PredictionLog::new(Arc::new(SqliteStore::new(path)))
    }

    /// A path whose parent is a regular file, so no directory can be made
    fn unwritable_path(dir: &tempfile::TempDir) -> PathBuf {
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        blocker.join("db").join("predictions.db")
    }

    #[tokio::test]
    async fn test_end_to_end_single_record() {
        let dir = tempfile::tempdir().unwrap();
        let log = sqlite_log(dir.path().join("test_predictions.db"));

        let (logs, _guard) = capture_logs();
        assert!(log.initialize().await);
        assert_eq!(log.save(&sample_fields(), 1, 0.85).await, Some(1));
        assert!(!logs.contents().contains("Error saving data"));

        let records = log.load_all().await;
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, 1);
        assert_eq!(
            (r.city_services, r.housing_costs, r.school_quality),
            (8, 6, 7)
        );
        assert_eq!((r.local_policies, r.maintenance, r.social_events), (5, 9, 4));
        assert_eq!(r.prediction, 1);
        assert!((r.probability - 0.85).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let log = sqlite_log(dir.path().join("predictions.db"));

        for _ in 0..3 {
            assert!(log.initialize().await);
        }
        assert!(log.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = unwritable_path(&dir);
        let log = sqlite_log(path.clone());
        let (logs, _guard) = capture_logs();

        assert!(!log.initialize().await);
        assert!(logs.contents().contains("Error initializing database"));
        assert!(!path.exists());
        assert!(!dir.path().join("blocker").is_dir());
    }

    #[tokio::test]
    async fn test_save_unwritable_location_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let log = sqlite_log(unwritable_path(&dir));
        let (logs, _guard) = capture_logs();

        assert_eq!(log.save(&sample_fields(), 75, 0.85).await, None);
        assert!(logs.contents().contains("Error saving data to the database"));

        assert!(log.load_all().await.is_empty());
        assert!(logs.contents().contains("Error reading data from database"));
        assert_eq!(log.count().await, None);
    }

    #[tokio::test]
    async fn test_save_missing_field_does_not_mutate() {
        let dir = tempfile::tempdir().unwrap();
        let log = sqlite_log(dir.path().join("predictions.db"));
        assert!(log.initialize().await);
        log.save(&sample_fields(), 1, 0.9).await;

        let mut partial = sample_fields();
        partial.remove("maintenance");
        let (logs, _guard) = capture_logs();
        assert_eq!(log.save(&partial, 0, 0.6).await, None);

        let output = logs.contents();
        assert!(output.contains("Error saving data to the database"));
        assert!(output.contains("Missing required field: maintenance"));

        assert_eq!(log.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_load_all_never_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let log = sqlite_log(dir.path().join("never").join("predictions.db"));
        assert!(log.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_backend_via_location() {
        let log = PredictionLog::open(&StoreLocation::Memory);
        assert!(log.initialize().await);
        assert_eq!(log.save(&sample_fields(), 0, 0.55).await, Some(1));
        assert_eq!(log.load_all().await[0].prediction, 0);
    }

    fn run<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_saved_rows_read_back_in_id_order(
            rows in proptest::collection::vec(
                (proptest::array::uniform6(any::<i64>()), 0i64..2, 0.0f64..=1.0),
                1..12,
            )
        ) {
            let dir = tempfile::tempdir().unwrap();
            let log = sqlite_log(dir.path().join("predictions.db"));

            let ids = run(async {
                let mut ids = Vec::new();
                for (ratings, prediction, probability) in &rows {
                    let fields: RatingFields = RatingField::ALL
                        .iter()
                        .zip(ratings)
                        .map(|(f, v)| (f.as_str().to_string(), *v))
                        .collect();
                    ids.push(log.save(&fields, *prediction, *probability).await);
                }
                ids
            });
            let ids: Vec<i64> = ids.into_iter().map(|id| id.unwrap()).collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));

            let records = run(log.load_all());
            prop_assert_eq!(records.len(), rows.len());
            prop_assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), ids);
            for (record, (ratings, prediction, probability)) in records.iter().zip(&rows) {
                prop_assert_eq!(record.measurement().features(), *ratings);
                prop_assert_eq!(record.prediction, *prediction);
                prop_assert!((record.probability - probability).abs() < 1e-6);
            }

            let last = records.last().unwrap();
            let (ratings, _, _) = rows.last().unwrap();
            prop_assert_eq!(
                [
                    last.city_services,
                    last.housing_costs,
                    last.school_quality,
                    last.local_policies,
                    last.maintenance,
                    last.social_events,
                ],
                *ratings
            );
        }

        #[test]
        fn prop_memory_ids_start_at_one(count in 1usize..20) {
            let log = PredictionLog::new(Arc::new(MemoryStore::new()));
            let ids = run(async {
                let mut ids = Vec::new();
                for _ in 0..count {
                    ids.push(log.save(&sample_fields(), 1, 0.5).await.unwrap());
                }
                ids
            });
            prop_assert_eq!(ids, (1..=count as i64).collect::<Vec<_>>());
        }
    }
}
