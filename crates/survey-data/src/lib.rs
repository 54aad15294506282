//! Survey Data
//!
//! Typed survey measurements, field-map conversion, and rating range checks.

mod error;
mod measurement;
mod validator;

pub use error::ValidationError;
pub use measurement::{RatingField, RatingFields, SurveyMeasurement};
pub use validator::{ValidationConfig, Validator};
