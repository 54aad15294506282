//! Prediction History Routes

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{views, AppState};
use storage::PredictionRecord;

/// Query parameters for predictions endpoint
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    /// Return only the most recent records (still in id order)
    pub limit: Option<usize>,
}

/// Response for predictions endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub data: Vec<PredictionRecord>,
    pub count: usize,
}

/// Get stored predictions as JSON
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictionQuery>,
) -> Json<PredictionResponse> {
    let mut data = state.predictions.load_all().await;

    if let Some(limit) = params.limit {
        let skip = data.len().saturating_sub(limit);
        data.drain(..skip);
    }

    Json(PredictionResponse {
        count: data.len(),
        data,
    })
}

/// Render stored predictions as an HTML table
pub async fn measurements(State(state): State<Arc<AppState>>) -> Html<String> {
    let records = state.predictions.load_all().await;
    let page = views::measurements_page(&records).into_string();
    info!("Measurement rows rendered successfully!");
    Html(page)
}
