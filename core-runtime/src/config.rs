//! # Runtime Configuration
//!
//! Top-level configuration for the resolution service process. Settings are
//! plain serde structs with defaults, loadable from a JSON file and
//! overridable from the environment:
//!
//! - `APP_ENV`: `development` (default) or `production`
//! - `LOG_FORMAT`: `pretty`, `json`, or `compact`
//! - `LOG_FILTER`: custom `EnvFilter` directive string

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    /// Local development: pretty logs, verbose defaults
    Development,
    /// Production: JSON logs, quiet defaults
    Production,
}

impl Default for RuntimeMode {
    fn default() -> Self {
        Self::Development
    }
}

impl RuntimeMode {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "Unknown APP_ENV value: {other:?} (expected development or production)"
            ))),
        }
    }
}

/// Process-level runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Deployment mode
    #[serde(default)]
    pub mode: RuntimeMode,

    /// Logging bootstrap settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let mode = match std::env::var("APP_ENV") {
            Ok(value) => RuntimeMode::parse(&value)?,
            Err(_) => RuntimeMode::default(),
        };

        let mut logging = LoggingConfig::default().with_format(match mode {
            RuntimeMode::Development => LogFormat::Pretty,
            RuntimeMode::Production => LogFormat::Json,
        });

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            logging.format = match format.as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                other => {
                    return Err(Error::Config(format!(
                        "Unknown LOG_FORMAT value: {other:?}"
                    )))
                }
            };
        }

        if let Ok(filter) = std::env::var("LOG_FILTER") {
            logging.filter = Some(filter);
        }

        Ok(Self { mode, logging })
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}
