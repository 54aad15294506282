//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `HAPPY__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use config::{Environment, File};
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config/happy.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub model: ModelSettings,
    pub rate_limit: RateLimitConfig,
    pub validation: ValidationSettings,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Prediction store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit store location; when unset it is derived from the environment
    pub location: Option<String>,
    /// SQLite file used for local deployments
    pub sqlite_path: PathBuf,
    /// Host name of the PostgreSQL server for remote deployments
    pub postgres_host: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            location: None,
            sqlite_path: PathBuf::from("database/predictions.db"),
            postgres_host: "postgres".to_string(),
        }
    }
}

/// Model training and caching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Labelled training CSV
    pub dataset_path: PathBuf,
    /// Trained model cache; not written when unset
    pub cache_path: Option<PathBuf>,
    /// Boosting hyper-parameters
    pub params: ModelConfig,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/happy_data.csv"),
            cache_path: Some(PathBuf::from("data/happy_model.json")),
            params: ModelConfig::default(),
        }
    }
}

/// Request validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Reject ratings outside 1..=5 with 422
    pub strict_ratings: bool,
}

/// Log output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load from `path` (required) or [`DEFAULT_CONFIG_FILE`] (optional),
    /// then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_from(path, Environment::with_prefix("HAPPY").separator("__"))
    }

    /// Load with an explicit environment source
    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Resolve the store location.
    ///
    /// An explicit `database.location` wins. Otherwise a non-empty `REMOTE`
    /// variable selects PostgreSQL built from `POSTGRES_USER`,
    /// `POSTGRES_PASSWORD` and `POSTGRES_DB`; anything else selects the
    /// local SQLite file.
    pub fn resolve_database_location<F>(&self, env: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(location) = self.database.location.as_deref().filter(|l| !l.trim().is_empty()) {
            return location.to_string();
        }

        let remote = env("REMOTE").map_or(false, |v| !v.trim().is_empty());
        if remote {
            let var = |k: &str| env(k).unwrap_or_default();
            format!(
                "postgresql://{}:{}@{}/{}",
                var("POSTGRES_USER"),
                var("POSTGRES_PASSWORD"),
                self.database.postgres_host,
                var("POSTGRES_DB")
            )
        } else {
            format!("sqlite://{}", self.database.sqlite_path.display())
        }
    }
}
