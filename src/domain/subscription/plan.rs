//! Plan value object: a validated tier with convenience predicates.

use serde::{Deserialize, Serialize};

use super::Tier;
use crate::domain::foundation::{DomainError, ErrorCode};

/// The tier a subscription is currently on.
///
/// Constructed either from a closed [`Tier`] or by parsing caller input,
/// which is where unknown tier names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan(Tier);

impl Plan {
    pub fn new(tier: Tier) -> Self {
        Self(tier)
    }

    /// Parses a tier name.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if blank
    /// - `InvalidTier` if the name is not a known tier
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.trim().is_empty() {
            return Err(DomainError::validation("tier", "Tier is required"));
        }
        raw.parse::<Tier>().map(Self).map_err(|_| {
            DomainError::new(ErrorCode::InvalidTier, format!("Unknown plan: {}", raw.trim()))
                .with_detail("tier", raw.trim())
        })
    }

    pub fn tier(&self) -> Tier {
        self.0
    }

    pub fn is_entry(&self) -> bool {
        self.0 == Tier::ENTRY
    }

    pub fn is_top(&self) -> bool {
        self.0 == Tier::Business
    }

    pub fn is(&self, tier: Tier) -> bool {
        self.0 == tier
    }

    /// True if `target` ranks strictly above this plan.
    pub fn can_upgrade_to(&self, target: Tier) -> bool {
        self.0.is_upgrade_to(target)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self(Tier::ENTRY)
    }
}

impl From<Tier> for Plan {
    fn from(tier: Tier) -> Self {
        Self(tier)
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
