//! Page and Ops Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::{views, AppState};

/// Rating form
pub async fn index() -> Html<String> {
    Html(views::index_page().into_string())
}

/// Prometheus exposition, if a recorder was installed
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
