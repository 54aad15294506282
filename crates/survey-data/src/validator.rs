//! Rating Range Checks

use crate::error::ValidationError;
use crate::measurement::{RatingField, SurveyMeasurement};
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Lowest accepted star rating
    pub min_rating: i64,
    /// Highest accepted star rating
    pub max_rating: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_rating: 1,
            max_rating: 5,
        }
    }
}

/// Range validator for survey measurements
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single rating against the configured range
    pub fn validate_rating(&self, field: RatingField, value: i64) -> Result<(), ValidationError> {
        if value < self.config.min_rating || value > self.config.max_rating {
            Err(ValidationError::OutOfRange {
                field: field.as_str(),
                value,
                min: self.config.min_rating,
                max: self.config.max_rating,
            })
        } else {
            Ok(())
        }
    }

    /// Validate every rating, collecting all violations
    pub fn validate(&self, measurement: &SurveyMeasurement) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<_> = RatingField::ALL
            .iter()
            .filter_map(|f| self.validate_rating(*f, measurement.get(*f)).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
