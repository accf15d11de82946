//! Immutable fill records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::{FillId, Money, OrderId, Quantity, Timestamp};

/// A single execution against an order.
///
/// Fills are created once by the fill recorder and never mutated or
/// deleted; the owning order's aggregates are recomputed instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Internal monotonic fill id.
    pub id: FillId,
    /// External-safe reference.
    pub uuid: Uuid,
    /// Venue-reported fill id, used for duplicate detection.
    pub external_fill_id: Option<String>,
    /// Owning order.
    pub order_id: OrderId,
    /// Quantity executed.
    pub quantity: Quantity,
    /// Execution price.
    pub price: Money,
    /// Commission charged for this fill.
    pub commission: Money,
    /// Asset the commission is denominated in.
    pub commission_asset: Option<String>,
    /// Whether the fill added or removed liquidity.
    pub liquidity: LiquidityType,
    /// Counterparty, when the venue discloses one.
    pub counterparty: Option<String>,
    /// Venue-reported execution time.
    pub fill_time: Timestamp,
    /// Ingestion time; never earlier than `fill_time`.
    pub created_at: Timestamp,
}

impl Fill {
    /// Create a new fill record.
    #[must_use]
    pub fn new(
        id: FillId,
        order_id: OrderId,
        quantity: Quantity,
        price: Money,
        fill_time: Timestamp,
    ) -> Self {
        Self {
            id,
            uuid: Uuid::new_v4(),
            external_fill_id: None,
            order_id,
            quantity,
            price,
            commission: Money::ZERO,
            commission_asset: None,
            liquidity: LiquidityType::Unknown,
            counterparty: None,
            fill_time,
            created_at: Timestamp::now(),
        }
    }

    /// Attach the venue-reported fill id.
    #[must_use]
    pub fn with_external_id(mut self, external_fill_id: impl Into<String>) -> Self {
        self.external_fill_id = Some(external_fill_id.into());
        self
    }

    /// Attach commission details.
    #[must_use]
    pub fn with_commission(mut self, commission: Money, asset: Option<String>) -> Self {
        self.commission = commission;
        self.commission_asset = asset;
        self
    }

    /// Attach the liquidity indicator.
    #[must_use]
    pub const fn with_liquidity(mut self, liquidity: LiquidityType) -> Self {
        self.liquidity = liquidity;
        self
    }

    /// Attach the counterparty.
    #[must_use]
    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    /// Notional value of this fill: quantity x price.
    #[must_use]
    pub fn value(&self) -> Money {
        Money::new(self.price.amount() * self.quantity.amount())
    }
}

/// Liquidity classification for fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiquidityType {
    /// Added liquidity.
    Maker,
    /// Removed liquidity.
    Taker,
    /// Venue did not report liquidity.
    Unknown,
}
