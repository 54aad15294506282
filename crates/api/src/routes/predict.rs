//! Prediction Route

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use survey_data::SurveyMeasurement;
use tracing::info;

use crate::{ApiError, AppState};

/// Response for the predict endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: i64,
    pub probability: f64,
}

/// Predict happiness for one survey measurement and log it.
///
/// Store failures are absorbed by the prediction log and never fail the request.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SurveyMeasurement>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(measurement) = payload?;

    if let Some(validator) = &state.validator {
        validator.validate(&measurement)?;
    }

    let prediction = state.classifier.predict(&measurement).map_err(|e| {
        metrics::counter!("prediction_errors_total").increment(1);
        ApiError::Unexpected(e.to_string())
    })?;

    let label = prediction.class.label();
    state
        .predictions
        .save_measurement(&measurement, label, prediction.probability)
        .await;

    metrics::counter!("predictions_total", "class" => prediction.class.as_str()).increment(1);
    info!("Request handled successfully!");

    Ok(Json(PredictResponse {
        prediction: label,
        probability: prediction.probability,
    }))
}
