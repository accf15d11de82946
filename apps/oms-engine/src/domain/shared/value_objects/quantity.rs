//! Quantity value object for order and fill sizes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use crate::domain::shared::DomainError;

/// A traded quantity.
///
/// Backed by a `Decimal` to represent fractional fills exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a new Quantity from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Quantity from an integer.
    #[must_use]
    pub fn from_i64(amount: i64) -> Self {
        Self(Decimal::new(amount, 0))
    }

    /// Zero quantity.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this quantity is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this quantity is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Get the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Saturating subtraction, floored at zero.
    #[must_use]
    pub fn saturating_sub(&self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - rhs.0)
        }
    }

    /// Validate this quantity for order creation.
    ///
    /// # Errors
    ///
    /// Returns error if the quantity is not strictly positive.
    pub fn validate_for_order(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_validate_for_order() {
        assert!(Quantity::from_i64(100).validate_for_order().is_ok());
        assert!(Quantity::ZERO.validate_for_order().is_err());
        assert!(Quantity::from_i64(-1).validate_for_order().is_err());
    }

    #[test]
    fn quantity_saturating_sub() {
        let a = Quantity::from_i64(10);
        let b = Quantity::from_i64(4);

        assert_eq!(a.saturating_sub(b), Quantity::from_i64(6));
        assert_eq!(b.saturating_sub(a), Quantity::ZERO);
    }

    #[test]
    fn quantity_arithmetic() {
        let a = Quantity::from_i64(3);
        let b = Quantity::from_i64(7);
        assert_eq!(a + b, Quantity::from_i64(10));
        assert_eq!(b - a, Quantity::from_i64(4));
    }

    #[test]
    fn quantity_display_normalizes_trailing_zeros() {
        let q = Quantity::new(Decimal::new(1500, 2)); // 15.00
        assert_eq!(format!("{q}"), "15");
    }
}
