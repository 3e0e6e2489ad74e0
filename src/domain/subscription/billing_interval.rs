//! Billing interval (monthly or yearly).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// How often a subscription is billed.
///
/// Periods are fixed-length: 30 days for monthly, 365 days for yearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Month,
    #[default]
    Year,
}

impl BillingInterval {
    /// Length of one billing period in days.
    pub fn period_days(&self) -> i64 {
        match self {
            BillingInterval::Month => 30,
            BillingInterval::Year => 365,
        }
    }

    /// End of a period that starts at `start`.
    pub fn period_end_from(&self, start: Timestamp) -> Timestamp {
        start.add_days(self.period_days())
    }

    /// Returns the persisted / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }
}

impl std::fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingInterval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" => Ok(BillingInterval::Month),
            "year" | "yearly" => Ok(BillingInterval::Year),
            other => Err(ValidationError::invalid_format(
                "billing_interval",
                format!("expected 'month' or 'year', got '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_yearly() {
        assert_eq!(BillingInterval::default(), BillingInterval::Year);
    }

    #[test]
    fn period_lengths_are_fixed() {
        let start = Timestamp::now();
        assert_eq!(
            BillingInterval::Month
                .period_end_from(start)
                .duration_since(&start)
                .num_days(),
            30
        );
        assert_eq!(
            BillingInterval::Year
                .period_end_from(start)
                .duration_since(&start)
                .num_days(),
            365
        );
    }

    #[test]
    fn parses_both_spellings() {
        assert_eq!("month".parse::<BillingInterval>().unwrap(), BillingInterval::Month);
        assert_eq!("Yearly".parse::<BillingInterval>().unwrap(), BillingInterval::Year);
        assert!("weekly".parse::<BillingInterval>().is_err());
    }
}
