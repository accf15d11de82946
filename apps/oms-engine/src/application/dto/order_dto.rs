//! Wire-shape DTOs for the order API.
//!
//! The HTTP contract keeps the flat field layout (price, stop_price,
//! iceberg_quantity, trailing_amount, trailing_percent as siblings);
//! conversion into the tagged `OrderType` happens here, so invalid
//! parameter combinations are rejected before they can reach the domain.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::orders::aggregate::{CreateOrderCommand, Order, OrderPatch};
use crate::domain::orders::errors::OrderError;
use crate::domain::orders::value_objects::{
    Fill, LiquidityType, OrderKind, OrderPriority, OrderSide, OrderSource, OrderStatus, OrderType,
    TimeInForce, TrailOffset,
};
use crate::domain::shared::{
    AccountId, BacktestId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp,
};

/// Request body for creating an order (also the risk-check shape).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Exchange-qualified symbol.
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Order type discriminant.
    pub order_type: OrderKind,
    /// Quantity to trade.
    pub quantity: Decimal,
    /// Limit price; required for limit/stop-limit, ignored for market.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Stop trigger price; required for stop/stop-limit/trailing-stop.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// Time in force.
    #[serde(default)]
    pub time_in_force: TimeInForce,
    /// Routing priority.
    #[serde(default)]
    pub priority: OrderPriority,
    /// Visible slice size; required iff order_type is iceberg.
    #[serde(default)]
    pub iceberg_quantity: Option<Decimal>,
    /// Absolute trailing offset; exactly one of the two trailing fields
    /// is required for trailing-stop orders.
    #[serde(default)]
    pub trailing_amount: Option<Decimal>,
    /// Percentage trailing offset.
    #[serde(default)]
    pub trailing_percent: Option<Decimal>,
    /// Expiry; required iff time_in_force is GTD.
    #[serde(default)]
    pub expire_time: Option<Timestamp>,
    /// Provenance; defaults to manual.
    #[serde(default)]
    pub source: OrderSource,
    /// Trading account.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Originating strategy.
    #[serde(default)]
    pub strategy_id: Option<String>,
    /// Originating backtest run.
    #[serde(default)]
    pub backtest_id: Option<String>,
    /// Parent order for child slices.
    #[serde(default)]
    pub parent_order_id: Option<i64>,
    /// Per-order position cap.
    #[serde(default)]
    pub max_position_size: Option<Decimal>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Convert into a domain command, assembling the tagged order type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderSpec` naming the offending field when the
    /// flat parameters do not form a valid combination.
    pub fn into_command(self) -> Result<CreateOrderCommand, OrderError> {
        let order_type = assemble_order_type(
            self.order_type,
            self.price,
            self.stop_price,
            self.iceberg_quantity,
            self.trailing_amount,
            self.trailing_percent,
        )?;

        let mut cmd = CreateOrderCommand::new(
            Symbol::new(self.symbol),
            self.side,
            order_type,
            Quantity::new(self.quantity),
        );
        cmd.time_in_force = self.time_in_force;
        cmd.expire_time = self.expire_time;
        cmd.priority = self.priority;
        cmd.source = self.source;
        cmd.account_id = self.account_id.map(AccountId::new);
        cmd.strategy_id = self.strategy_id.map(StrategyId::new);
        cmd.backtest_id = self.backtest_id.map(BacktestId::new);
        cmd.parent_order_id = self.parent_order_id.map(OrderId::new);
        cmd.max_position_size = self.max_position_size.map(Quantity::new);
        cmd.tags = self
            .tags
            .map(|tags| tags.into_iter().collect::<BTreeSet<_>>())
            .unwrap_or_default();
        cmd.notes = self.notes.unwrap_or_default();

        Ok(cmd)
    }
}

fn missing(field: &str, message: &str) -> OrderError {
    OrderError::InvalidOrderSpec {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[allow(clippy::too_many_lines)]
fn assemble_order_type(
    kind: OrderKind,
    price: Option<Decimal>,
    stop_price: Option<Decimal>,
    iceberg_quantity: Option<Decimal>,
    trailing_amount: Option<Decimal>,
    trailing_percent: Option<Decimal>,
) -> Result<OrderType, OrderError> {
    // Fields that belong to other order types are rejected outright.
    if iceberg_quantity.is_some() && kind != OrderKind::Iceberg {
        return Err(missing(
            "iceberg_quantity",
            "Only valid for iceberg orders",
        ));
    }
    if (trailing_amount.is_some() || trailing_percent.is_some())
        && kind != OrderKind::TrailingStop
    {
        return Err(missing(
            "trailing_amount",
            "Trailing offsets are only valid for trailing-stop orders",
        ));
    }

    let price = price.map(Money::new);
    let stop = stop_price.map(Money::new);

    match kind {
        OrderKind::Market => Ok(OrderType::Market),
        OrderKind::Limit => Ok(OrderType::Limit {
            price: price.ok_or_else(|| missing("price", "Required for limit orders"))?,
        }),
        OrderKind::Stop => Ok(OrderType::Stop {
            stop_price: stop
                .ok_or_else(|| missing("stop_price", "Required for stop orders"))?,
        }),
        OrderKind::StopLimit => Ok(OrderType::StopLimit {
            price: price.ok_or_else(|| missing("price", "Required for stop-limit orders"))?,
            stop_price: stop
                .ok_or_else(|| missing("stop_price", "Required for stop-limit orders"))?,
        }),
        OrderKind::TrailingStop => {
            let stop_price = stop.ok_or_else(|| {
                missing("stop_price", "Required for trailing-stop orders")
            })?;
            let trail = match (trailing_amount, trailing_percent) {
                (Some(amount), None) => TrailOffset::Amount(Money::new(amount)),
                (None, Some(pct)) => TrailOffset::Percent(pct),
                (Some(_), Some(_)) => {
                    return Err(missing(
                        "trailing_amount",
                        "Set exactly one of trailing_amount or trailing_percent",
                    ));
                }
                (None, None) => {
                    return Err(missing(
                        "trailing_amount",
                        "Trailing-stop orders require trailing_amount or trailing_percent",
                    ));
                }
            };
            Ok(OrderType::TrailingStop { stop_price, trail })
        }
        OrderKind::Iceberg => Ok(OrderType::Iceberg {
            price,
            display_quantity: iceberg_quantity.map(Quantity::new).ok_or_else(|| {
                missing("iceberg_quantity", "Required for iceberg orders")
            })?,
        }),
        OrderKind::Twap => Ok(OrderType::Twap { price }),
        OrderKind::Vwap => Ok(OrderType::Vwap { price }),
    }
}

/// Request body for updating an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderRequest {
    /// New quantity.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// New limit price.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// New stop price.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// New time in force.
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<OrderPriority>,
    /// New expiry.
    #[serde(default)]
    pub expire_time: Option<Timestamp>,
    /// Replacement tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Replacement notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateOrderRequest {
    /// Convert into a domain patch.
    #[must_use]
    pub fn into_patch(self) -> OrderPatch {
        OrderPatch {
            quantity: self.quantity.map(Quantity::new),
            price: self.price.map(Money::new),
            stop_price: self.stop_price.map(Money::new),
            time_in_force: self.time_in_force,
            priority: self.priority,
            expire_time: self.expire_time,
            tags: self.tags.map(|tags| tags.into_iter().collect()),
            notes: self.notes,
        }
    }
}

/// Read-model view of an order, flat wire layout with derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    /// Internal id.
    pub id: OrderId,
    /// External-safe reference.
    pub uuid: Uuid,
    /// Venue order reference.
    pub venue_order_id: Option<String>,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Order type discriminant.
    pub order_type: OrderKind,
    /// Limit price, when the type carries one.
    pub price: Option<Money>,
    /// Stop price, when the type carries one.
    pub stop_price: Option<Money>,
    /// Iceberg display quantity.
    pub iceberg_quantity: Option<Quantity>,
    /// Absolute trailing offset.
    pub trailing_amount: Option<Money>,
    /// Percentage trailing offset.
    pub trailing_percent: Option<Decimal>,
    /// Total quantity.
    pub quantity: Quantity,
    /// Filled quantity.
    pub filled_quantity: Quantity,
    /// Remaining quantity.
    pub remaining_quantity: Quantity,
    /// Filled fraction in [0, 1].
    pub fill_ratio: Decimal,
    /// Weighted mean fill price.
    pub avg_fill_price: Money,
    /// quantity x avg_fill_price once fills exist.
    pub total_value: Option<Money>,
    /// Accumulated commission.
    pub commission: Money,
    /// Commission asset.
    pub commission_asset: Option<String>,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// GTD expiry.
    pub expire_time: Option<Timestamp>,
    /// Routing priority.
    pub priority: OrderPriority,
    /// Provenance.
    pub source: OrderSource,
    /// Trading account.
    pub account_id: Option<String>,
    /// Originating strategy.
    pub strategy_id: Option<String>,
    /// Originating backtest run.
    pub backtest_id: Option<String>,
    /// Parent order.
    pub parent_order_id: Option<OrderId>,
    /// Per-order position cap.
    pub max_position_size: Option<Quantity>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Risk gate outcome.
    pub risk_check_passed: bool,
    /// Risk or rejection message.
    pub risk_check_message: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Notes.
    pub notes: String,
    /// Created at.
    pub created_at: Timestamp,
    /// Updated at.
    pub updated_at: Timestamp,
    /// Submitted at.
    pub submitted_at: Option<Timestamp>,
    /// Accepted at.
    pub accepted_at: Option<Timestamp>,
    /// Filled at.
    pub filled_at: Option<Timestamp>,
    /// Cancelled at.
    pub cancelled_at: Option<Timestamp>,
}

impl OrderView {
    /// Build the view from a domain order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        let (trailing_amount, trailing_percent) = match order.order_type() {
            OrderType::TrailingStop { trail, .. } => match trail {
                TrailOffset::Amount(amount) => (Some(*amount), None),
                TrailOffset::Percent(pct) => (None, Some(*pct)),
            },
            _ => (None, None),
        };

        Self {
            id: order.id(),
            uuid: order.uuid(),
            venue_order_id: order.venue_order_id().map(|v| v.as_str().to_string()),
            symbol: order.symbol().as_str().to_string(),
            side: order.side(),
            order_type: order.order_type().kind(),
            price: order.order_type().limit_price(),
            stop_price: order.order_type().stop_price(),
            iceberg_quantity: order.order_type().display_quantity(),
            trailing_amount,
            trailing_percent,
            quantity: order.quantity(),
            filled_quantity: order.filled_quantity(),
            remaining_quantity: order.remaining_quantity(),
            fill_ratio: order.fill_ratio(),
            avg_fill_price: order.avg_fill_price(),
            total_value: order.total_value(),
            commission: order.commission(),
            commission_asset: order.fill_state().commission_asset().map(String::from),
            time_in_force: order.time_in_force(),
            expire_time: order.expire_time(),
            priority: order.priority(),
            source: order.source(),
            account_id: order.account_id().map(|a| a.as_str().to_string()),
            strategy_id: order.strategy_id().map(|s| s.as_str().to_string()),
            backtest_id: order.backtest_id().map(|b| b.as_str().to_string()),
            parent_order_id: order.parent_order_id(),
            max_position_size: order.max_position_size(),
            status: order.status(),
            risk_check_passed: order.risk_check_passed(),
            risk_check_message: order.risk_check_message().to_string(),
            tags: order.tags().iter().cloned().collect(),
            notes: order.notes().to_string(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
            submitted_at: order.submitted_at(),
            accepted_at: order.accepted_at(),
            filled_at: order.filled_at(),
            cancelled_at: order.cancelled_at(),
        }
    }
}

/// Read-model view of a fill.
#[derive(Debug, Clone, Serialize)]
pub struct FillView {
    /// Internal id.
    pub id: i64,
    /// External-safe reference.
    pub uuid: Uuid,
    /// Venue fill id.
    pub external_fill_id: Option<String>,
    /// Owning order.
    pub order_id: OrderId,
    /// Quantity executed.
    pub quantity: Quantity,
    /// Execution price.
    pub price: Money,
    /// quantity x price.
    pub value: Money,
    /// Commission.
    pub commission: Money,
    /// Commission asset.
    pub commission_asset: Option<String>,
    /// Liquidity indicator.
    pub liquidity: LiquidityType,
    /// Counterparty.
    pub counterparty: Option<String>,
    /// Venue execution time.
    pub fill_time: Timestamp,
    /// Ingestion time.
    pub created_at: Timestamp,
}

impl FillView {
    /// Build the view from a domain fill.
    #[must_use]
    pub fn from_fill(fill: &Fill) -> Self {
        Self {
            id: fill.id.value(),
            uuid: fill.uuid,
            external_fill_id: fill.external_fill_id.clone(),
            order_id: fill.order_id,
            quantity: fill.quantity,
            price: fill.price,
            value: fill.value(),
            commission: fill.commission,
            commission_asset: fill.commission_asset.clone(),
            liquidity: fill.liquidity,
            counterparty: fill.counterparty.clone(),
            fill_time: fill.fill_time,
            created_at: fill.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(kind: OrderKind) -> CreateOrderRequest {
        CreateOrderRequest {
            symbol: "NASDAQ:AAPL".to_string(),
            side: OrderSide::Buy,
            order_type: kind,
            quantity: Decimal::new(10, 0),
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Day,
            priority: OrderPriority::Normal,
            iceberg_quantity: None,
            trailing_amount: None,
            trailing_percent: None,
            expire_time: None,
            source: OrderSource::Manual,
            account_id: None,
            strategy_id: None,
            backtest_id: None,
            parent_order_id: None,
            max_position_size: None,
            tags: None,
            notes: None,
        }
    }

    #[test]
    fn limit_requires_price() {
        let request = base_request(OrderKind::Limit);
        let err = request.into_command().unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidOrderSpec { ref field, .. } if field == "price"
        ));

        let mut request = base_request(OrderKind::Limit);
        request.price = Some(Decimal::new(100, 0));
        let cmd = request.into_command().unwrap();
        assert_eq!(cmd.order_type.kind(), OrderKind::Limit);
    }

    #[test]
    fn market_ignores_price() {
        let mut request = base_request(OrderKind::Market);
        request.price = Some(Decimal::new(100, 0));
        let cmd = request.into_command().unwrap();
        assert_eq!(cmd.order_type, OrderType::Market);
    }

    #[test]
    fn stop_limit_requires_both_prices() {
        let mut request = base_request(OrderKind::StopLimit);
        request.price = Some(Decimal::new(100, 0));
        assert!(request.clone().into_command().is_err());

        request.stop_price = Some(Decimal::new(99, 0));
        assert!(request.into_command().is_ok());
    }

    #[test]
    fn trailing_stop_requires_exactly_one_offset() {
        let mut request = base_request(OrderKind::TrailingStop);
        request.stop_price = Some(Decimal::new(95, 0));

        assert!(request.clone().into_command().is_err());

        request.trailing_amount = Some(Decimal::new(5, 0));
        assert!(request.clone().into_command().is_ok());

        request.trailing_percent = Some(Decimal::new(5, 0));
        assert!(request.clone().into_command().is_err());

        request.trailing_amount = None;
        assert!(request.into_command().is_ok());
    }

    #[test]
    fn iceberg_quantity_rejected_for_other_types() {
        let mut request = base_request(OrderKind::Limit);
        request.price = Some(Decimal::new(100, 0));
        request.iceberg_quantity = Some(Decimal::new(5, 0));

        let err = request.into_command().unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidOrderSpec { ref field, .. } if field == "iceberg_quantity"
        ));
    }

    #[test]
    fn tags_collect_into_set() {
        let mut request = base_request(OrderKind::Market);
        request.tags = Some(vec![
            "swing".to_string(),
            "tech".to_string(),
            "swing".to_string(),
        ]);

        let cmd = request.into_command().unwrap();
        assert_eq!(cmd.tags.len(), 2);
    }

    #[test]
    fn order_view_flattens_type_parameters() {
        let mut request = base_request(OrderKind::TrailingStop);
        request.stop_price = Some(Decimal::new(95, 0));
        request.trailing_percent = Some(Decimal::new(3, 0));
        let cmd = request.into_command().unwrap();
        let order = Order::new(OrderId::new(1), cmd).unwrap();

        let view = OrderView::from_order(&order);
        assert_eq!(view.order_type, OrderKind::TrailingStop);
        assert_eq!(view.stop_price, Some(Money::from_units(95)));
        assert_eq!(view.trailing_percent, Some(Decimal::new(3, 0)));
        assert!(view.trailing_amount.is_none());
        assert_eq!(view.remaining_quantity, Quantity::from_i64(10));
    }

    #[test]
    fn update_request_into_patch() {
        let request = UpdateOrderRequest {
            quantity: Some(Decimal::new(20, 0)),
            notes: Some("resize".to_string()),
            ..UpdateOrderRequest::default()
        };

        let patch = request.into_patch();
        assert_eq!(patch.quantity, Some(Quantity::from_i64(20)));
        assert_eq!(patch.notes.as_deref(), Some("resize"));
        assert!(patch.price.is_none());
    }
}
