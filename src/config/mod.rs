//! Application configuration management

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/scriptorium.db";

/// Data-layer configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite location: either a `sqlite:` URL or a plain file path.
    /// Read from DATABASE_PATH, falling back to DATABASE_URL
    pub database_url: String,

    /// Maximum pooled connections
    pub max_connections: u32,

    /// How long an operation waits for a pooled connection
    pub acquire_timeout: Duration,

    /// Delay between attempts in [`Database::connect_with_retry`](crate::db::Database::connect_with_retry)
    pub retry_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
            retry_interval: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and then read the environment
    pub fn load() -> Result<Self> {
        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, defaults filling the gaps
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let database_url = non_blank(&lookup, "DATABASE_PATH")
            .or_else(|| non_blank(&lookup, "DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        let max_connections = match non_blank(&lookup, "DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            None => defaults.max_connections,
        };

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: seconds(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS")?
                .unwrap_or(defaults.acquire_timeout),
            retry_interval: seconds(&lookup, "DATABASE_RETRY_INTERVAL_SECS")?
                .unwrap_or(defaults.retry_interval),
        })
    }

    /// Configuration for a database file at `path`, other settings at their defaults
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: path.as_ref().display().to_string(),
            ..Self::default()
        }
    }
}

/// The value of `key`, treating an empty or whitespace-only value as unset
fn non_blank(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    match non_blank(lookup, key) {
        Some(value) => {
            let secs: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid {key}"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}
