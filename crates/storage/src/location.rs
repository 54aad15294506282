//! Store Location Parsing

use crate::StorageError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where predictions are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file
    Sqlite(PathBuf),
    /// PostgreSQL connection URL
    Postgres(String),
    /// Process-local, lost on exit
    Memory,
}

impl FromStr for StoreLocation {
    type Err = StorageError;

    /// Accepts `sqlite://<path>`, a bare file path, `postgres://...`,
    /// `postgresql://...`, `memory` or `:memory:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StorageError::InvalidLocation("empty location".to_string()));
        }

        if matches!(s, "memory" | ":memory:" | "memory://") {
            return Ok(StoreLocation::Memory);
        }

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            return Ok(StoreLocation::Postgres(s.to_string()));
        }

        if let Some(path) = s.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(StorageError::InvalidLocation(s.to_string()));
            }
            return Ok(StoreLocation::Sqlite(PathBuf::from(path)));
        }

        if s.contains("://") {
            return Err(StorageError::InvalidLocation(format!("unsupported scheme in {s}")));
        }

        Ok(StoreLocation::Sqlite(PathBuf::from(s)))
    }
}

impl fmt::Display for StoreLocation {
    /// Credentials in PostgreSQL URLs are masked.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::Sqlite(path) => write!(f, "sqlite://{}", path.display()),
            StoreLocation::Postgres(url) => write!(f, "{}", mask_password(url)),
            StoreLocation::Memory => write!(f, "memory"),
        }
    }
}

fn mask_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
