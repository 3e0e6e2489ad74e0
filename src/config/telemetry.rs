//! Telemetry configuration and tracing setup

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::error::{ConfigError, ValidationError};

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Environment name
    #[serde(default)]
    pub environment: Environment,

    /// Log filter directive (`RUST_LOG` syntax)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Application environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for development.
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

impl TelemetryConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Deployed environments log JSON.
    pub fn log_format(&self) -> LogFormat {
        match self.environment {
            Environment::Development => LogFormat::Pretty,
            Environment::Staging | Environment::Production => LogFormat::Json,
        }
    }

    /// Validate telemetry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        EnvFilter::try_new(&self.log_level)
            .map(|_| ())
            .map_err(|_| ValidationError::InvalidLogLevel(self.log_level.clone()))
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info,creator_billing=debug".to_string()
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| ConfigError::TracingInit(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format() {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| ConfigError::TracingInit(e.to_string()))
}
