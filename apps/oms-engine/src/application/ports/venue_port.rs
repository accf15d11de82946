//! Venue connector port (driven port).
//!
//! Interface to an external trading system. One implementation exists per
//! integrated venue; the execution router depends only on this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::orders::value_objects::{
    LiquidityType, OrderPriority, OrderSide, OrderType, TimeInForce,
};
use crate::domain::shared::{AccountId, Money, OrderId, Quantity, Symbol, Timestamp, VenueOrderId};

/// Request to submit an order to a venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSubmitRequest {
    /// Internal order id, echoed in logs and diagnostics.
    pub order_id: OrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type with parameters.
    pub order_type: OrderType,
    /// Quantity to trade.
    pub quantity: Quantity,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Expiry for GTD orders.
    pub expire_time: Option<Timestamp>,
    /// Routing priority; venues may use it for queue selection.
    pub priority: OrderPriority,
}

/// Venue-reported order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueOrderStatus {
    /// Venue acknowledged the order; it is resting.
    Accepted,
    /// Some quantity executed, remainder resting.
    PartiallyFilled,
    /// Completely executed.
    Filled,
    /// Cancelled at the venue (including IOC leftovers).
    Cancelled,
    /// Rejected by the venue (including FOK misses).
    Rejected,
    /// Expired at the venue.
    Expired,
}

/// A single execution event reported by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Venue-assigned fill id; the idempotence key for ingestion.
    pub external_fill_id: String,
    /// Quantity executed.
    pub quantity: Quantity,
    /// Execution price.
    pub price: Money,
    /// Commission charged.
    pub commission: Money,
    /// Commission asset.
    pub commission_asset: Option<String>,
    /// Liquidity indicator.
    pub liquidity: LiquidityType,
    /// Counterparty, when disclosed.
    pub counterparty: Option<String>,
    /// Venue-reported execution time.
    pub fill_time: Timestamp,
}

/// Venue-reported view of an order: status plus the cumulative fill list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueOrderSnapshot {
    /// Venue-assigned order reference.
    pub venue_order_id: VenueOrderId,
    /// Current venue status.
    pub status: VenueOrderStatus,
    /// Reject reason, when status is `Rejected`.
    pub reject_reason: Option<String>,
    /// All execution reports for the order, oldest first.
    pub fills: Vec<ExecutionReport>,
}

/// Errors from venue operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VenueError {
    /// Connector is not connected to its venue.
    #[error("Venue '{venue}' is disconnected")]
    Disconnected {
        /// Venue name.
        venue: String,
    },

    /// Order rejected at submission time.
    #[error("Order rejected by venue: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// The venue does not know this order reference.
    #[error("Venue order not found: {0}")]
    OrderNotFound(String),

    /// Venue API failure.
    #[error("Venue API error: {message}")]
    Api {
        /// Error details.
        message: String,
    },
}

/// Capability set of an external trading system.
#[async_trait]
pub trait VenueConnector: Send + Sync {
    /// Venue name for routing, logging, and health reporting.
    fn venue_name(&self) -> &str;

    /// The account this connector trades under.
    fn account_id(&self) -> &AccountId;

    /// Whether the connector currently has a live venue session.
    ///
    /// The router treats disconnected connectors as unavailable rather
    /// than silently dropping orders.
    fn is_connected(&self) -> bool;

    /// Submit an order, returning the venue's reference for it.
    async fn submit(&self, request: &VenueSubmitRequest) -> Result<VenueOrderId, VenueError>;

    /// Request cancellation of a previously submitted order.
    async fn cancel(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError>;

    /// Query the venue's current view of an order.
    async fn query_status(
        &self,
        venue_order_id: &VenueOrderId,
    ) -> Result<VenueOrderSnapshot, VenueError>;
}
