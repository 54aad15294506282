//! Training Data Loading

use crate::InferenceError;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;
use survey_data::SurveyMeasurement;
use tracing::info;

/// One labelled survey answer, as found in the training CSV
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrainingRow {
    pub city_services: i64,
    pub housing_costs: i64,
    pub school_quality: i64,
    pub local_policies: i64,
    pub maintenance: i64,
    pub social_events: i64,
    /// 1 = happy, 0 = unhappy
    pub happiness: i64,
}

impl TrainingRow {
    /// Labelled row from a measurement
    pub fn new(measurement: SurveyMeasurement, happiness: i64) -> Self {
        Self {
            city_services: measurement.city_services,
            housing_costs: measurement.housing_costs,
            school_quality: measurement.school_quality,
            local_policies: measurement.local_policies,
            maintenance: measurement.maintenance,
            social_events: measurement.social_events,
            happiness,
        }
    }

    /// The six ratings of this row
    pub fn measurement(&self) -> SurveyMeasurement {
        SurveyMeasurement {
            city_services: self.city_services,
            housing_costs: self.housing_costs,
            school_quality: self.school_quality,
            local_policies: self.local_policies,
            maintenance: self.maintenance,
            social_events: self.social_events,
        }
    }
}

/// Labelled training data
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    rows: Vec<TrainingRow>,
}

impl TrainingSet {
    /// Build from rows already in memory
    pub fn from_rows(rows: Vec<TrainingRow>) -> Self {
        Self { rows }
    }

    /// Read a comma-separated file with a header row naming the six
    /// rating columns and `happiness`
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| InferenceError::Dataset(format!("{}: {}", path.display(), e)))?;

        let rows = rdr
            .deserialize::<TrainingRow>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InferenceError::Dataset(format!("{}: {}", path.display(), e)))?;

        if rows.is_empty() {
            return Err(InferenceError::Dataset(format!("{}: no rows", path.display())));
        }

        info!("Loaded {} training rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }

    /// Training rows
    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
