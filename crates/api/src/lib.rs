//! Happiness Prediction API Server
//!
//! Rating form, prediction endpoint, and prediction history.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use inference_engine::{Classifier, HappyModel};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use storage::{PredictionLog, StoreLocation};
use survey_data::{ValidationConfig, Validator};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
mod error;
pub mod rate_limit;
pub mod routes;
mod views;

pub use config::AppConfig;
pub use error::{ApiError, ERR_UNEXPECTED};

/// Application state shared across handlers
pub struct AppState {
    /// Prediction persistence
    pub predictions: PredictionLog,
    /// Model behind `/predict`
    pub classifier: Arc<dyn Classifier>,
    /// Range checks; `None` accepts any integer rating
    pub validator: Option<Validator>,
    /// Prometheus handle for `/metrics`
    pub metrics: Option<PrometheusHandle>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(predictions: PredictionLog, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            predictions,
            classifier,
            validator: None,
            metrics: None,
            static_dir: PathBuf::from("static"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Reject ratings outside the configured range
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Expose a Prometheus recorder at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Serve static assets from `dir`
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: String,
    /// `None` when the store cannot be read
    pub prediction_count: Option<i64>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(routes::pages::index))
        .route("/predict", post(routes::predict::predict))
        .route("/measurements", get(routes::predictions::measurements))
        .route("/api/v1/predictions", get(routes::predictions::get_predictions))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(routes::pages::metrics))
        .nest_service("/static", static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        store: state.predictions.describe(),
        prediction_count: state.predictions.count().await,
    })
}

/// Initialize logging; `RUST_LOG` overrides the default `info` filter
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Open the store, load the model, and serve until Ctrl-C
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let location: StoreLocation = config
        .resolve_database_location(|k| std::env::var(k).ok())
        .parse()?;
    let predictions = PredictionLog::open(&location);
    if !predictions.initialize().await {
        warn!("Prediction store unavailable; predictions will be served but not saved");
    }

    let model_settings = config.model.clone();
    let model = tokio::task::spawn_blocking(move || {
        HappyModel::load_or_train(
            &model_settings.dataset_path,
            model_settings.cache_path.as_deref(),
            &model_settings.params,
        )
    })
    .await??;

    let mut state = AppState::new(predictions, Arc::new(model))
        .with_static_dir(config.server.static_dir.clone());
    if config.validation.strict_ratings {
        state = state.with_validator(Validator::new(ValidationConfig::default()));
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Metrics disabled: {}", e),
    }

    let mut app = create_router(Arc::new(state));
    if let Some(governor) = rate_limit::create_governor_config(&config.rate_limit) {
        info!(
            "Rate limiting: 1 request per {}s, burst {}",
            config.rate_limit.per_second, config.rate_limit.burst_size
        );
        app = app.layer(GovernorLayer { config: governor });
    }

    let addr = config.server.addr();
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
