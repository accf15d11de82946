//! Order type as a tagged union.
//!
//! Each variant carries only the parameters its execution style requires,
//! so an order with a missing or contradictory parameter set cannot be
//! constructed in the first place.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{Money, Quantity};

/// Trailing offset for trailing-stop orders.
///
/// Exactly one of the two forms is set; an order carrying both an absolute
/// amount and a percentage (or neither) is rejected at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrailOffset {
    /// Absolute price offset from the reference price.
    Amount(Money),
    /// Percentage offset from the reference price.
    Percent(rust_decimal::Decimal),
}

/// Order type specifying execution behavior, with type-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at best available price. Carries no price.
    Market,
    /// Execute at the limit price or better.
    Limit {
        /// Limit price.
        price: Money,
    },
    /// Becomes a market order when the stop price is reached.
    Stop {
        /// Trigger price.
        stop_price: Money,
    },
    /// Becomes a limit order when the stop price is reached.
    StopLimit {
        /// Limit price once triggered.
        price: Money,
        /// Trigger price.
        stop_price: Money,
    },
    /// Stop that trails the market by a fixed offset.
    TrailingStop {
        /// Initial trigger price.
        stop_price: Money,
        /// How the trigger follows the market.
        trail: TrailOffset,
    },
    /// Shows only a slice of the full quantity at a time.
    Iceberg {
        /// Optional limit price for the visible slice.
        price: Option<Money>,
        /// Visible quantity per slice; must be below the order quantity.
        display_quantity: Quantity,
    },
    /// Time-weighted average price execution.
    Twap {
        /// Optional limit cap for child slices.
        price: Option<Money>,
    },
    /// Volume-weighted average price execution.
    Vwap {
        /// Optional limit cap for child slices.
        price: Option<Money>,
    },
}

impl OrderType {
    /// The fieldless classification of this order type.
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::Market => OrderKind::Market,
            Self::Limit { .. } => OrderKind::Limit,
            Self::Stop { .. } => OrderKind::Stop,
            Self::StopLimit { .. } => OrderKind::StopLimit,
            Self::TrailingStop { .. } => OrderKind::TrailingStop,
            Self::Iceberg { .. } => OrderKind::Iceberg,
            Self::Twap { .. } => OrderKind::Twap,
            Self::Vwap { .. } => OrderKind::Vwap,
        }
    }

    /// The limit price, when this type carries one.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Money> {
        match self {
            Self::Limit { price } | Self::StopLimit { price, .. } => Some(*price),
            Self::Iceberg { price, .. } | Self::Twap { price } | Self::Vwap { price } => *price,
            Self::Market | Self::Stop { .. } | Self::TrailingStop { .. } => None,
        }
    }

    /// The stop trigger price, when this type carries one.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Money> {
        match self {
            Self::Stop { stop_price }
            | Self::StopLimit { stop_price, .. }
            | Self::TrailingStop { stop_price, .. } => Some(*stop_price),
            _ => None,
        }
    }

    /// The visible slice size for iceberg orders.
    #[must_use]
    pub const fn display_quantity(&self) -> Option<Quantity> {
        match self {
            Self::Iceberg {
                display_quantity, ..
            } => Some(*display_quantity),
            _ => None,
        }
    }

    /// Returns true for order types the price-sanity risk check applies to.
    #[must_use]
    pub const fn has_firm_limit_price(&self) -> bool {
        matches!(self, Self::Limit { .. } | Self::StopLimit { .. })
    }
}

/// Fieldless order-type classification, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop order.
    Stop,
    /// Stop-limit order.
    StopLimit,
    /// Trailing-stop order.
    TrailingStop,
    /// Iceberg order.
    Iceberg,
    /// TWAP order.
    Twap,
    /// VWAP order.
    Vwap,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
            Self::TrailingStop => write!(f, "TRAILING_STOP"),
            Self::Iceberg => write!(f, "ICEBERG"),
            Self::Twap => write!(f, "TWAP"),
            Self::Vwap => write!(f, "VWAP"),
        }
    }
}
