//! Subscription tier definitions.
//!
//! Represents the three plan levels a creator can subscribe to. Tiers carry
//! no numbers themselves; limits and pricing live in the plan catalog.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription tier, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry tier - free, a handful of products.
    Starter,

    /// Middle tier - more products, pinned products, lower commission.
    Pro,

    /// Top tier - unlimited products, lowest commission, trial available.
    Business,
}

impl Tier {
    /// All tiers in ascending rank order.
    pub const ALL: [Tier; 3] = [Tier::Starter, Tier::Pro, Tier::Business];

    /// The tier new subscriptions start on.
    pub const ENTRY: Tier = Tier::Starter;

    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank = more features. Used for upgrade validation.
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Starter => 0,
            Tier::Pro => 1,
            Tier::Business => 2,
        }
    }

    /// Returns true if moving from `self` to `target` strictly increases rank.
    pub fn is_upgrade_to(&self, target: Tier) -> bool {
        target.rank() > self.rank()
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Starter => "Starter",
            Tier::Pro => "Pro",
            Tier::Business => "Business",
        }
    }

    /// Returns the persisted / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Starter => "starter",
            Tier::Pro => "pro",
            Tier::Business => "business",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Tier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "starter" => Ok(Tier::Starter),
            "pro" => Ok(Tier::Pro),
            "business" => Ok(Tier::Business),
            "" => Err(ValidationError::empty_field("tier")),
            other => Err(ValidationError::invalid_format(
                "tier",
                format!("unknown tier '{}'", other),
            )),
        }
    }
}
