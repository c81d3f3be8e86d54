use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Postgres connection URL. When unset, `DATABASE_URL` from the environment is used.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Defaults applied to listing queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Row limit used when a caller does not pass one.
    pub default_limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, used when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for daily rolling log files. Logs go to stdout only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// The URL to connect with: the configured one, or `DATABASE_URL`.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        match &self.url {
            Some(url) if !url.trim().is_empty() => Ok(url.clone()),
            _ => env::var("DATABASE_URL").map_err(|_| {
                ConfigError::ValidationError(
                    "database.url or DATABASE_URL must be set.".to_string(),
                )
            }),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.search.default_limit <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "search.default_limit must be positive, got {}",
                self.search.default_limit
            )));
        }
        Ok(())
    }
}
