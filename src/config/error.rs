//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Grace period must be between {min} and {max} days, got {actual}")]
    InvalidGracePeriod { min: u32, max: u32, actual: u32 },

    #[error("Invalid redirect URL for {0}")]
    InvalidRedirectUrl(&'static str),

    #[error("Redirect URL for {0} must use HTTPS in production")]
    RedirectMustBeHttps(&'static str),

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
