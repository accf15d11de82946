//! Pre-trade risk validation.
//!
//! `RiskValidator::check` is a pure function over the proposed order and a
//! read-only account context; persisting the result alongside the order is
//! the caller's business.

use rust_decimal::Decimal;

use super::account_context::AccountContext;
use super::result::{RiskCheckResult, RiskCode};
use crate::domain::orders::aggregate::Order;
use crate::domain::orders::value_objects::OrderType;
use crate::domain::shared::{Money, Quantity};

/// Tunable limits for the risk validator.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Allowed deviation of a limit price from the reference price,
    /// as a fraction (0.20 = +/-20%).
    pub price_band: Decimal,
    /// Window within which an equivalent order counts as a duplicate.
    pub duplicate_window_secs: i64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            price_band: Decimal::new(20, 2), // 0.20
            duplicate_window_secs: 30,
        }
    }
}

/// Validates proposed orders against account state.
#[derive(Debug, Clone, Default)]
pub struct RiskValidator {
    limits: RiskLimits,
}

impl RiskValidator {
    /// Create a validator with the given limits.
    #[must_use]
    pub const fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    /// Run all checks in order, collecting errors and warnings.
    ///
    /// Hard failures do not stop later checks from contributing warnings;
    /// `passed` reflects the absence of errors only.
    #[must_use]
    pub fn check(&self, order: &Order, ctx: &AccountContext) -> RiskCheckResult {
        let mut result = RiskCheckResult::pass();

        let estimate_price = order
            .order_type()
            .limit_price()
            .or_else(|| ctx.reference_price(order.symbol()));

        // 1. Buying power
        if let Some(price) = estimate_price {
            let estimated_value = Money::new(price.amount() * order.quantity().amount());
            if estimated_value > ctx.buying_power {
                result.add_error(
                    RiskCode::InsufficientFunds,
                    format!(
                        "Estimated order value {estimated_value} exceeds buying power {}",
                        ctx.buying_power
                    ),
                );
                if price.is_positive() {
                    let affordable = (ctx.buying_power.amount() / price.amount()).floor();
                    if affordable > Decimal::ZERO {
                        result.add_suggestion(format!(
                            "Reduce quantity to {affordable} to stay within buying power"
                        ));
                    }
                }
            }

            // Account-level per-order value cap
            if let Some(max_value) = ctx.max_order_value {
                if estimated_value > max_value {
                    result.add_error(
                        RiskCode::OrderValueLimitExceeded,
                        format!(
                            "Estimated order value {estimated_value} exceeds per-order cap {max_value}"
                        ),
                    );
                }
            }
        }

        // 2. Position limit
        let current = ctx.position(order.symbol());
        let signed_qty = Decimal::from(order.side().position_sign()) * order.quantity().amount();
        let resulting = Quantity::new(current.amount() + signed_qty);
        let limit = order
            .max_position_size()
            .into_iter()
            .chain(ctx.position_limit(order.symbol()))
            .min();
        if let Some(limit) = limit {
            if resulting.abs() > limit {
                result.add_error(
                    RiskCode::PositionLimitExceeded,
                    format!(
                        "Resulting position {} exceeds limit {limit} for {}",
                        resulting,
                        order.symbol()
                    ),
                );
                let headroom = (limit.amount() - current.amount().abs()).max(Decimal::ZERO);
                result.add_suggestion(format!(
                    "Reduce quantity to {headroom} to stay within the position limit"
                ));
            }
        }

        // 3. Price sanity for firm limit prices
        if order.order_type().has_firm_limit_price() {
            if let (Some(price), Some(reference)) = (
                order.order_type().limit_price(),
                ctx.reference_price(order.symbol()),
            ) {
                if reference.is_positive() {
                    let deviation =
                        ((price.amount() - reference.amount()) / reference.amount()).abs();
                    if deviation > self.limits.price_band {
                        result.add_warning(
                            RiskCode::PriceOutlier,
                            format!(
                                "Limit price {price} deviates {:.1}% from reference {reference}",
                                deviation * Decimal::ONE_HUNDRED
                            ),
                        );
                    }
                }
            }
        }

        // 4. Duplicate heuristic
        let window = self.limits.duplicate_window_secs;
        let duplicate = ctx.recent_orders.iter().any(|recent| {
            recent.symbol == *order.symbol()
                && recent.side == order.side()
                && recent.quantity == order.quantity()
                && recent.price == order.order_type().limit_price()
                && order.created_at().seconds_since(recent.created_at).abs() <= window
        });
        if duplicate {
            result.add_warning(
                RiskCode::PossibleDuplicate,
                format!(
                    "An equivalent open order for {} was submitted within {window}s",
                    order.symbol()
                ),
            );
        }

        // 5. Type-specific re-validation (already enforced at creation)
        if let OrderType::Iceberg {
            display_quantity, ..
        } = order.order_type()
        {
            if *display_quantity >= order.quantity() {
                result.add_error(
                    RiskCode::InvalidIcebergQuantity,
                    format!(
                        "Iceberg display quantity {display_quantity} must be below order quantity {}",
                        order.quantity()
                    ),
                );
            }
        }

        result
    }
}
