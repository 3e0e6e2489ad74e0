//! Billing policy configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Shortest configurable grace period.
pub const MIN_GRACE_PERIOD_DAYS: u32 = 1;

/// Longest configurable grace period.
pub const MAX_GRACE_PERIOD_DAYS: u32 = 60;

/// Billing policy
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BillingConfig {
    /// Days a past-due subscription keeps access before it is cancelled
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: u32,
}

impl BillingConfig {
    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_GRACE_PERIOD_DAYS..=MAX_GRACE_PERIOD_DAYS).contains(&self.grace_period_days) {
            return Err(ValidationError::InvalidGracePeriod {
                min: MIN_GRACE_PERIOD_DAYS,
                max: MAX_GRACE_PERIOD_DAYS,
                actual: self.grace_period_days,
            });
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            grace_period_days: default_grace_period_days(),
        }
    }
}

fn default_grace_period_days() -> u32 {
    7
}
