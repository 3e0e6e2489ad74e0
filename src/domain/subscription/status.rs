//! Subscription status state machine.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// In good standing.
    Active,

    /// A payment failed; the subscription is in its grace period.
    PastDue,

    /// Cancelled. Terminal.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns the persisted / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SubscriptionStatus::Cancelled)
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From ACTIVE
            (Active, Active) // Renewal
                | (Active, PastDue)
                | (Active, Cancelled)
            // From PAST_DUE
                | (PastDue, Active)
                | (PastDue, PastDue) // Repeated failure re-stamps the grace start
                | (PastDue, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![Active, PastDue, Cancelled],
            PastDue => vec![Active, PastDue, Cancelled],
            Cancelled => vec![],
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "cancelled" | "canceled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}
