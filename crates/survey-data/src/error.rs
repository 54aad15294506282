//! Validation Error Types

use thiserror::Error;

/// Errors while turning raw input into a survey measurement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Rating outside the allowed star range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
