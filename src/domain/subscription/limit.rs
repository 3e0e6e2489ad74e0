//! Usage limits and the three-valued limit status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Sentinel used on the wire and in storage for an unlimited allowance.
pub const UNLIMITED: i64 = -1;

/// Usage ratio (in percent) at or above which a capped resource is "near" its limit.
pub const NEAR_LIMIT_PERCENT: u64 = 80;

/// Maximum number of slots a plan grants for a resource.
///
/// Serialized as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    Capped(u32),
    Unlimited,
}

impl Limit {
    /// Returns true if there is no cap.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Returns the cap, or `None` when unlimited.
    pub fn cap(&self) -> Option<u32> {
        match self {
            Limit::Capped(cap) => Some(*cap),
            Limit::Unlimited => None,
        }
    }

    /// True if one more slot may be consumed: unlimited, or strictly below the cap.
    pub fn allows_another(&self, current: u32) -> bool {
        match self {
            Limit::Capped(cap) => current < *cap,
            Limit::Unlimited => true,
        }
    }

    /// True if the cap is finite and usage has reached it.
    pub fn is_at_limit(&self, current: u32) -> bool {
        match self {
            Limit::Capped(cap) => current >= *cap,
            Limit::Unlimited => false,
        }
    }

    /// True if the cap is finite and usage is at or above 80% of it.
    ///
    /// A zero cap with zero usage has no ratio and is not near; it is still
    /// at the limit.
    pub fn is_near_limit(&self, current: u32) -> bool {
        match self {
            Limit::Capped(0) => current > 0,
            Limit::Capped(cap) => u64::from(current) * 100 >= u64::from(*cap) * NEAR_LIMIT_PERCENT,
            Limit::Unlimited => false,
        }
    }

    /// Classifies usage against this limit.
    ///
    /// | usage | status |
    /// |-------|--------|
    /// | `current >= cap` | Blocked |
    /// | `current == cap - 1` | Warning |
    /// | otherwise, or unlimited | Ok |
    pub fn status_for(&self, current: u32) -> LimitStatus {
        match self {
            Limit::Unlimited => LimitStatus::Ok,
            Limit::Capped(cap) if current >= *cap => LimitStatus::Blocked,
            Limit::Capped(cap) if current + 1 == *cap => LimitStatus::Warning,
            Limit::Capped(_) => LimitStatus::Ok,
        }
    }

    /// Returns the integer form, `-1` when unlimited.
    pub fn as_sentinel(&self) -> i64 {
        match self {
            Limit::Capped(cap) => i64::from(*cap),
            Limit::Unlimited => UNLIMITED,
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        limit.as_sentinel()
    }
}

impl TryFrom<i64> for Limit {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            UNLIMITED => Ok(Limit::Unlimited),
            v if v >= 0 && v <= i64::from(u32::MAX) => Ok(Limit::Capped(v as u32)),
            v => Err(ValidationError::out_of_range(
                "limit",
                UNLIMITED,
                i64::from(u32::MAX),
                v,
            )),
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Capped(cap) => write!(f, "{}", cap),
            Limit::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Outcome of checking usage against a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    /// Room to spare (always the case for unlimited resources).
    Ok,
    /// Exactly one slot left.
    Warning,
    /// No slots left.
    Blocked,
}

impl LimitStatus {
    pub fn is_blocked(&self) -> bool {
        matches!(self, LimitStatus::Blocked)
    }

    /// Warning or worse.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, LimitStatus::Ok)
    }
}
