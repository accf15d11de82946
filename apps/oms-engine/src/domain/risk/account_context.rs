//! Read-only account context consumed by the risk validator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::orders::value_objects::OrderSide;
use crate::domain::shared::{Money, Quantity, Symbol, Timestamp};

/// Snapshot of a recently submitted open order, used by the duplicate
/// heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Quantity,
    /// Limit price, when the order carried one.
    pub price: Option<Money>,
    /// When the order was created.
    pub created_at: Timestamp,
}

/// Read-only view of account state at validation time.
///
/// The validator never mutates this; callers assemble it from whatever
/// account bookkeeping system they integrate with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountContext {
    /// Available buying power.
    pub buying_power: Money,
    /// Signed position size per symbol.
    pub positions: HashMap<Symbol, Quantity>,
    /// Per-symbol position limits (absolute size).
    pub position_limits: HashMap<Symbol, Quantity>,
    /// Account-level cap on a single order's estimated value.
    pub max_order_value: Option<Money>,
    /// Last-known reference price per symbol.
    pub reference_prices: HashMap<Symbol, Money>,
    /// Recently submitted open orders.
    pub recent_orders: Vec<RecentOrder>,
}

impl AccountContext {
    /// Context with the given buying power and nothing else.
    #[must_use]
    pub fn with_buying_power(buying_power: Money) -> Self {
        Self {
            buying_power,
            ..Self::default()
        }
    }

    /// Current signed position for a symbol, zero when flat.
    #[must_use]
    pub fn position(&self, symbol: &Symbol) -> Quantity {
        self.positions.get(symbol).copied().unwrap_or(Quantity::ZERO)
    }

    /// Configured position limit for a symbol, if any.
    #[must_use]
    pub fn position_limit(&self, symbol: &Symbol) -> Option<Quantity> {
        self.position_limits.get(symbol).copied()
    }

    /// Last-known reference price for a symbol, if any.
    #[must_use]
    pub fn reference_price(&self, symbol: &Symbol) -> Option<Money> {
        self.reference_prices.get(symbol).copied()
    }

    /// Set a position (builder style, for tests and demo wiring).
    #[must_use]
    pub fn with_position(mut self, symbol: Symbol, quantity: Quantity) -> Self {
        self.positions.insert(symbol, quantity);
        self
    }

    /// Set a position limit (builder style).
    #[must_use]
    pub fn with_position_limit(mut self, symbol: Symbol, limit: Quantity) -> Self {
        self.position_limits.insert(symbol, limit);
        self
    }

    /// Set a reference price (builder style).
    #[must_use]
    pub fn with_reference_price(mut self, symbol: Symbol, price: Money) -> Self {
        self.reference_prices.insert(symbol, price);
        self
    }
}
