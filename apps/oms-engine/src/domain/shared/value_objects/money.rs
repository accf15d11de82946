//! Money value object for prices and notional amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::domain::shared::DomainError;

/// A monetary amount.
///
/// Backed by a `Decimal` so fill economics and risk arithmetic stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create a new Money value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from an f64 amount.
    ///
    /// # Panics
    ///
    /// Panics if the f64 cannot be converted to Decimal. Intended for
    /// test fixtures and demo wiring, not request paths.
    #[must_use]
    pub fn from_f64(amount: f64) -> Self {
        Self(Decimal::try_from(amount).expect("valid f64"))
    }

    /// Create a Money value from whole units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::new(units, 0))
    }

    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Get the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Validate this amount as an order price.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is not strictly positive.
    pub fn validate_as_price(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "price".to_string(),
                message: "Price must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_arithmetic() {
        let a = Money::from_f64(100.50);
        let b = Money::from_f64(0.25);

        assert_eq!(a + b, Money::from_f64(100.75));
        assert_eq!(a - b, Money::from_f64(100.25));
    }

    #[test]
    fn money_sign_checks() {
        assert!(Money::from_units(5).is_positive());
        assert!(Money::from_units(-5).is_negative());
        assert!(Money::ZERO.is_zero());
    }

    #[test]
    fn money_validate_as_price() {
        assert!(Money::from_f64(99.95).validate_as_price().is_ok());
        assert!(Money::ZERO.validate_as_price().is_err());
        assert!(Money::from_units(-1).validate_as_price().is_err());
    }

    #[test]
    fn money_display_two_decimal_places() {
        assert_eq!(format!("{}", Money::from_f64(1234.5)), "1234.50");
    }

    #[test]
    fn money_ordering() {
        assert!(Money::from_units(2) > Money::from_units(1));
    }

    #[test]
    fn money_serde_transparent() {
        let json = serde_json::to_string(&Money::from_units(42)).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
