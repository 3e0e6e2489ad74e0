//! Commission rate value object (basis points).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Share of a sale retained by the platform, in basis points (1/100 of a percent).
///
/// Stored as an integer so that commission on an amount in cents never goes
/// through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionRate(u16);

impl CommissionRate {
    /// Largest representable rate: 100%.
    pub const MAX_BASIS_POINTS: u16 = 10_000;

    /// Creates a rate from basis points, rejecting values above 100%.
    pub fn from_basis_points(bps: u16) -> Result<Self, ValidationError> {
        if bps > Self::MAX_BASIS_POINTS {
            return Err(ValidationError::out_of_range(
                "commission_rate",
                0,
                i64::from(Self::MAX_BASIS_POINTS),
                i64::from(bps),
            ));
        }
        Ok(Self(bps))
    }

    /// Creates a rate for compile-time catalog data. Caller guarantees range.
    pub(crate) const fn basis_points_unchecked(bps: u16) -> Self {
        Self(bps)
    }

    /// Returns the rate in basis points.
    pub fn basis_points(&self) -> u16 {
        self.0
    }

    /// Returns the rate as a decimal fraction (0.05 for 5%).
    pub fn as_decimal(&self) -> f64 {
        f64::from(self.0) / 10_000.0
    }

    /// Commission owed on an amount in minor currency units, rounded down.
    pub fn commission_on(&self, amount_cents: i64) -> i64 {
        amount_cents * i64::from(self.0) / 10_000
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_rates_up_to_one_hundred_percent() {
        assert!(CommissionRate::from_basis_points(0).is_ok());
        assert!(CommissionRate::from_basis_points(10_000).is_ok());
    }

    #[test]
    fn rejects_rates_above_one_hundred_percent() {
        assert!(CommissionRate::from_basis_points(10_001).is_err());
    }

    #[test]
    fn as_decimal_converts_basis_points() {
        let rate = CommissionRate::from_basis_points(500).unwrap();
        assert!((rate.as_decimal() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn commission_on_rounds_down_to_whole_cents() {
        let rate = CommissionRate::from_basis_points(400).unwrap();
        assert_eq!(rate.commission_on(1_999), 79);
        assert_eq!(rate.commission_on(10_000), 400);
    }

    #[test]
    fn displays_as_percentage() {
        let rate = CommissionRate::from_basis_points(450).unwrap();
        assert_eq!(rate.to_string(), "4.50%");
    }
}
