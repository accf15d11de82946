//! Order lifecycle errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors that can occur while creating or mutating orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The order specification failed static validation.
    InvalidOrderSpec {
        /// Field with the offending value.
        field: String,
        /// Error message.
        message: String,
    },

    /// The attempted operation requires an active order.
    OrderNotEditable {
        /// Current status.
        status: OrderStatus,
    },

    /// A quantity update would drop below the already-filled quantity.
    QuantityBelowFilled {
        /// Requested quantity.
        requested: String,
        /// Already filled quantity.
        filled: String,
    },

    /// A fill would push the cumulative quantity past the order quantity.
    OverFill {
        /// Fill quantity attempted.
        fill_quantity: String,
        /// Remaining quantity.
        remaining: String,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// The order has not passed its risk check.
    RiskCheckNotPassed,

    /// Order not found.
    NotFound {
        /// Order id.
        order_id: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOrderSpec { field, message } => {
                write!(f, "Invalid order spec, field '{field}': {message}")
            }
            Self::OrderNotEditable { status } => {
                write!(f, "Order is not editable in status {status}")
            }
            Self::QuantityBelowFilled { requested, filled } => {
                write!(
                    f,
                    "Quantity {requested} is below filled quantity {filled}"
                )
            }
            Self::OverFill {
                fill_quantity,
                remaining,
            } => {
                write!(
                    f,
                    "Fill quantity {fill_quantity} exceeds remaining {remaining}"
                )
            }
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Invalid order state transition {from} -> {to}: {reason}")
            }
            Self::RiskCheckNotPassed => {
                write!(f, "Order has not passed its risk check")
            }
            Self::NotFound { order_id } => {
                write!(f, "Order not found: {order_id}")
            }
        }
    }
}

impl std::error::Error for OrderError {}
