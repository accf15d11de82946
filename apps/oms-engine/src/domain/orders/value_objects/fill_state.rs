//! Fill aggregation state for an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Fill;
use crate::domain::shared::{DomainError, Money, Quantity, Timestamp};

/// Aggregated execution state, recomputed from owned fills.
///
/// The order's `filled_quantity` must equal the sum of the recorded fill
/// quantities at all times; `verify_integrity` checks exactly that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillState {
    filled_quantity: Quantity,
    avg_fill_price: Money,
    commission: Money,
    commission_asset: Option<String>,
    fills: Vec<Fill>,
    last_fill_at: Option<Timestamp>,
}

impl FillState {
    /// Empty state for a freshly created order.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            filled_quantity: Quantity::ZERO,
            avg_fill_price: Money::ZERO,
            commission: Money::ZERO,
            commission_asset: None,
            fills: Vec::new(),
            last_fill_at: None,
        }
    }

    /// Cumulative filled quantity.
    #[must_use]
    pub fn filled_quantity(&self) -> Quantity {
        self.filled_quantity
    }

    /// Quantity-weighted mean fill price; zero until the first fill.
    #[must_use]
    pub fn avg_fill_price(&self) -> Money {
        self.avg_fill_price
    }

    /// Accumulated commission across fills.
    #[must_use]
    pub fn commission(&self) -> Money {
        self.commission
    }

    /// Commission asset taken from the first commissioned fill.
    #[must_use]
    pub fn commission_asset(&self) -> Option<&str> {
        self.commission_asset.as_deref()
    }

    /// The recorded fills, in ingestion order.
    #[must_use]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Timestamp of the most recent fill.
    #[must_use]
    pub fn last_fill_at(&self) -> Option<Timestamp> {
        self.last_fill_at
    }

    /// Returns true if a fill with this external id was already recorded.
    #[must_use]
    pub fn has_external_fill(&self, external_fill_id: &str) -> bool {
        self.fills
            .iter()
            .any(|f| f.external_fill_id.as_deref() == Some(external_fill_id))
    }

    /// Find a recorded fill by its external id.
    #[must_use]
    pub fn find_by_external_id(&self, external_fill_id: &str) -> Option<&Fill> {
        self.fills
            .iter()
            .find(|f| f.external_fill_id.as_deref() == Some(external_fill_id))
    }

    /// Apply a fill, updating filled quantity, weighted mean price, and
    /// commission.
    ///
    /// # Errors
    ///
    /// Returns error if the fill would push the cumulative quantity past
    /// `order_quantity`.
    pub fn apply(&mut self, fill: Fill, order_quantity: Quantity) -> Result<(), DomainError> {
        let new_filled = self.filled_quantity + fill.quantity;
        if new_filled > order_quantity {
            return Err(DomainError::InvariantViolation {
                aggregate: "Order".to_string(),
                invariant: "filled_quantity <= quantity".to_string(),
                state: format!(
                    "filled={}, fill={}, quantity={}",
                    self.filled_quantity, fill.quantity, order_quantity
                ),
            });
        }

        // Weighted mean: (old_avg * old_filled + price * qty) / new_filled
        if new_filled.amount() > Decimal::ZERO {
            let prior_value = self.avg_fill_price.amount() * self.filled_quantity.amount();
            let fill_value = fill.price.amount() * fill.quantity.amount();
            self.avg_fill_price = Money::new((prior_value + fill_value) / new_filled.amount());
        }

        self.filled_quantity = new_filled;
        self.commission += fill.commission;
        if self.commission_asset.is_none() {
            self.commission_asset = fill.commission_asset.clone();
        }
        self.last_fill_at = Some(fill.fill_time);
        self.fills.push(fill);

        debug_assert!(self.verify_integrity());

        Ok(())
    }

    /// Check that `filled_quantity` equals the sum of recorded fills.
    #[must_use]
    pub fn verify_integrity(&self) -> bool {
        let total: Decimal = self.fills.iter().map(|f| f.quantity.amount()).sum();
        self.filled_quantity.amount() == total
    }
}

impl Default for FillState {
    fn default() -> Self {
        Self::empty()
    }
}
