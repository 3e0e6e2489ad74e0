//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CREATOR_BILLING` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use creator_billing::config::{init_tracing, AppConfig};
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! init_tracing(&config.telemetry).expect("Failed to install tracing");
//! ```

mod billing;
mod error;
mod provider;
mod telemetry;

pub use billing::{BillingConfig, MAX_GRACE_PERIOD_DAYS, MIN_GRACE_PERIOD_DAYS};
pub use error::{ConfigError, ValidationError};
pub use provider::ProviderConfig;
pub use telemetry::{init_tracing, Environment, LogFormat, TelemetryConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Billing policy (grace period)
    #[serde(default)]
    pub billing: BillingConfig,

    /// Billing provider credentials and redirects
    pub provider: ProviderConfig,

    /// Logging setup
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads variables with the `CREATOR_BILLING` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `CREATOR_BILLING__BILLING__GRACE_PERIOD_DAYS=14` -> `billing.grace_period_days = 14`
    /// - `CREATOR_BILLING__PROVIDER__API_KEY=...` -> `provider.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or malformed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CREATOR_BILLING")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.billing.validate()?;
        self.provider.validate(self.is_production())?;
        self.telemetry.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.telemetry.is_production()
    }
}
