//! Happiness Prediction Service - Main Entry Point
//!
//! Usage: `happy-server [CONFIG_FILE]` (or set `HAPPY_CONFIG`).

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HAPPY_CONFIG").ok())
        .map(PathBuf::from);

    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_logging(config.logging.json);

    info!("=== Happiness Prediction v{} ===", env!("CARGO_PKG_VERSION"));
    run_server(config).await
}
