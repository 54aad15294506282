//! Prediction Record

use serde::{Deserialize, Serialize};
use survey_data::SurveyMeasurement;

/// One stored prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PredictionRecord {
    pub id: i64,
    pub city_services: i64,
    pub housing_costs: i64,
    pub school_quality: i64,
    pub local_policies: i64,
    pub maintenance: i64,
    pub social_events: i64,
    pub prediction: i64,
    pub probability: f64,
}

impl PredictionRecord {
    /// Build a record from a measurement and the classifier output
    pub fn new(id: i64, measurement: &SurveyMeasurement, prediction: i64, probability: f64) -> Self {
        Self {
            id,
            city_services: measurement.city_services,
            housing_costs: measurement.housing_costs,
            school_quality: measurement.school_quality,
            local_policies: measurement.local_policies,
            maintenance: measurement.maintenance,
            social_events: measurement.social_events,
            prediction,
            probability,
        }
    }

    /// The six ratings of this record
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
