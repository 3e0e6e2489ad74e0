//! Plan catalog: per-tier limits, commission, trial length, pricing and features.
//!
//! Pure lookups over compile-time data. Every function matches exhaustively on
//! [`Tier`], so an unknown tier cannot be represented.
//!
//! # Tier Configuration
//!
//! | Tier | Products | Pinned | Commission | Trial | Monthly | Yearly |
//! |------|----------|--------|------------|-------|---------|--------|
//! | Starter | 10 | 0 | 5% | - | 0 | 0 |
//! | Pro | 50 | 5 | 4% | - | 19.00 | 190.00 |
//! | Business | Unlimited | Unlimited | 3% | 14 days | 49.00 | 490.00 |

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{BillingInterval, Limit, Tier};
use crate::domain::foundation::{CommissionRate, Timestamp, ValidationError};

/// Limits and commission granted by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub product_limit: Limit,
    pub pinned_products_limit: Limit,
    pub commission_rate: CommissionRate,
}

/// Price points in minor currency units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPricing {
    pub monthly_cents: i64,
    pub yearly_cents: i64,
}

impl PlanPricing {
    /// Price charged per period for the given interval.
    pub fn for_interval(&self, interval: BillingInterval) -> i64 {
        match interval {
            BillingInterval::Month => self.monthly_cents,
            BillingInterval::Year => self.yearly_cents,
        }
    }
}

/// Named capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Dashboard,
    Analytics,
    Export,
    PrioritySupport,
    CustomDomain,
    PinnedProducts,
    TrialAvailable,
}

impl FromStr for Feature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dashboard" => Ok(Feature::Dashboard),
            "analytics" => Ok(Feature::Analytics),
            "export" => Ok(Feature::Export),
            "priority_support" => Ok(Feature::PrioritySupport),
            "custom_domain" => Ok(Feature::CustomDomain),
            "pinned_products" => Ok(Feature::PinnedProducts),
            "trial_available" => Ok(Feature::TrialAvailable),
            other => Err(ValidationError::invalid_format(
                "feature",
                format!("unknown feature '{}'", other),
            )),
        }
    }
}

/// Full set of capability flags for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeatures {
    pub dashboard: bool,
    pub analytics: bool,
    pub export: bool,
    pub priority_support: bool,
    pub custom_domain: bool,
    pub pinned_products: bool,
    pub trial_available: bool,
}

impl PlanFeatures {
    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Dashboard => self.dashboard,
            Feature::Analytics => self.analytics,
            Feature::Export => self.export,
            Feature::PrioritySupport => self.priority_support,
            Feature::CustomDomain => self.custom_domain,
            Feature::PinnedProducts => self.pinned_products,
            Feature::TrialAvailable => self.trial_available,
        }
    }
}

/// Catalog entry for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanDefinition {
    pub tier: Tier,
    pub limits: PlanLimits,
    /// Zero means the tier never offers a trial.
    pub trial_days: u32,
    pub pricing: PlanPricing,
    pub features: PlanFeatures,
}

const STARTER: PlanDefinition = PlanDefinition {
    tier: Tier::Starter,
    limits: PlanLimits {
        product_limit: Limit::Capped(10),
        pinned_products_limit: Limit::Capped(0),
        commission_rate: CommissionRate::basis_points_unchecked(500),
    },
    trial_days: 0,
    pricing: PlanPricing {
        monthly_cents: 0,
        yearly_cents: 0,
    },
    features: PlanFeatures {
        dashboard: true,
        analytics: false,
        export: false,
        priority_support: false,
        custom_domain: false,
        pinned_products: false,
        trial_available: false,
    },
};

const PRO: PlanDefinition = PlanDefinition {
    tier: Tier::Pro,
    limits: PlanLimits {
        product_limit: Limit::Capped(50),
        pinned_products_limit: Limit::Capped(5),
        commission_rate: CommissionRate::basis_points_unchecked(400),
    },
    trial_days: 0,
    pricing: PlanPricing {
        monthly_cents: 1_900,
        yearly_cents: 19_000,
    },
    features: PlanFeatures {
        dashboard: true,
        analytics: true,
        export: true,
        priority_support: false,
        custom_domain: false,
        pinned_products: true,
        trial_available: false,
    },
};

const BUSINESS: PlanDefinition = PlanDefinition {
    tier: Tier::Business,
    limits: PlanLimits {
        product_limit: Limit::Unlimited,
        pinned_products_limit: Limit::Unlimited,
        commission_rate: CommissionRate::basis_points_unchecked(300),
    },
    trial_days: 14,
    pricing: PlanPricing {
        monthly_cents: 4_900,
        yearly_cents: 49_000,
    },
    features: PlanFeatures {
        dashboard: true,
        analytics: true,
        export: true,
        priority_support: true,
        custom_domain: true,
        pinned_products: true,
        trial_available: true,
    },
};

/// Returns the catalog entry for a tier.
pub fn definition(tier: Tier) -> &'static PlanDefinition {
    match tier {
        Tier::Starter => &STARTER,
        Tier::Pro => &PRO,
        Tier::Business => &BUSINESS,
    }
}

/// Product limit, pinned-product limit and commission rate for a tier.
pub fn limits_for(tier: Tier) -> PlanLimits {
    definition(tier).limits
}

/// Price in cents for one period of the given interval.
pub fn pricing_for(tier: Tier, interval: BillingInterval) -> i64 {
    definition(tier).pricing.for_interval(interval)
}

/// Whether a tier includes a capability.
pub fn has_feature(tier: Tier, feature: Feature) -> bool {
    definition(tier).features.has(feature)
}

/// Trial length in days; zero when the tier has no trial.
pub fn trial_days(tier: Tier) -> u32 {
    definition(tier).trial_days
}

/// End of a trial starting at `start`, or `None` if the tier has no trial.
pub fn trial_end_date(tier: Tier, start: Timestamp) -> Option<Timestamp> {
    match trial_days(tier) {
        0 => None,
        days => Some(start.add_days(i64::from(days))),
    }
}

/// True iff `to` ranks strictly above `from`.
pub fn is_upgrade(from: Tier, to: Tier) -> bool {
    from.is_upgrade_to(to)
}

/// Amount saved per year by paying yearly: annual billing costs ten months.
pub fn yearly_savings(tier: Tier) -> i64 {
    2 * definition(tier).pricing.monthly_cents
}
