//! Survey Measurement Types

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One of the six survey questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingField {
    /// Availability of information about city services
    CityServices,
    /// Cost of housing
    HousingCosts,
    /// Overall quality of public schools
    SchoolQuality,
    /// Trust in the local police
    LocalPolicies,
    /// Maintenance of streets and sidewalks
    Maintenance,
    /// Availability of social community events
    SocialEvents,
}

impl RatingField {
    /// All fields in canonical (column) order
    pub const ALL: [RatingField; 6] = [
        RatingField::CityServices,
        RatingField::HousingCosts,
        RatingField::SchoolQuality,
        RatingField::LocalPolicies,
        RatingField::Maintenance,
        RatingField::SocialEvents,
    ];

    /// Column / JSON key name
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingField::CityServices => "city_services",
            RatingField::HousingCosts => "housing_costs",
            RatingField::SchoolQuality => "school_quality",
            RatingField::LocalPolicies => "local_policies",
            RatingField::Maintenance => "maintenance",
            RatingField::SocialEvents => "social_events",
        }
    }

    /// Question shown on the rating form
    pub fn question(&self) -> &'static str {
        match self {
            RatingField::CityServices => {
                "How satisfied are you with the availability of information about the city services?"
            }
            RatingField::HousingCosts => "How satisfied are you with the cost of housing?",
            RatingField::SchoolQuality => {
                "How satisfied are you with the overall quality of public schools?"
            }
            RatingField::LocalPolicies => "How much do you trust in the local police?",
            RatingField::Maintenance => {
                "How satisfied are you with the maintenance of streets and sidewalks?"
            }
            RatingField::SocialEvents => {
                "How satisfied are you with the availability of social community events?"
            }
        }
    }
}

/// Map of rating name to value, as received from loosely-typed callers
pub type RatingFields = HashMap<String, i64>;

/// A single survey measurement: six star ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyMeasurement {
    pub city_services: i64,
    pub housing_costs: i64,
    pub school_quality: i64,
    pub local_policies: i64,
    pub maintenance: i64,
    pub social_events: i64,
}

impl SurveyMeasurement {
    /// Build a measurement from a field map.
    ///
    /// Fails on the first missing key in canonical order. Extra keys are ignored.
    pub fn from_fields(fields: &RatingFields) -> Result<Self, ValidationError> {
        let get = |field: RatingField| {
            fields
                .get(field.as_str())
                .copied()
                .ok_or(ValidationError::MissingField(field.as_str()))
        };

        Ok(Self {
            city_services: get(RatingField::CityServices)?,
            housing_costs: get(RatingField::HousingCosts)?,
            school_quality: get(RatingField::SchoolQuality)?,
            local_policies: get(RatingField::LocalPolicies)?,
            maintenance: get(RatingField::Maintenance)?,
            social_events: get(RatingField::SocialEvents)?,
        })
    }

    /// Convert back into a field map
    pub fn to_fields(&self) -> RatingFields {
        RatingField::ALL
            .iter()
            .map(|f| (f.as_str().to_string(), self.get(*f)))
            .collect()
    }

    /// Value of a single rating
    pub fn get(&self, field: RatingField) -> i64 {
        match field {
            RatingField::CityServices => self.city_services,
            RatingField::HousingCosts => self.housing_costs,
            RatingField::SchoolQuality => self.school_quality,
            RatingField::LocalPolicies => self.local_policies,
            RatingField::Maintenance => self.maintenance,
            RatingField::SocialEvents => self.social_events,
        }
    }

    /// Ratings in canonical order, as model features
    pub fn features(&self) -> [i64; 6] {
        RatingField::ALL.map(|f| self.get(f))
    }
}
