//! Order aggregate root.
//!
//! The Order aggregate owns the full lifecycle of a client order: static
//! validation at creation, forward-only status transitions, and fill
//! aggregation. All mutation goes through the methods here so the
//! invariants are enforced in one place.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::orders::errors::OrderError;
use crate::domain::orders::services::OrderStateMachine;
use crate::domain::orders::value_objects::{
    Fill, FillState, OrderPriority, OrderSide, OrderSource, OrderStatus, OrderType, TimeInForce,
    TrailOffset,
};
use crate::domain::shared::{
    AccountId, BacktestId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp, VenueOrderId,
};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type with its type-specific parameters.
    pub order_type: OrderType,
    /// Quantity to trade.
    pub quantity: Quantity,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Expiry for GTD orders.
    pub expire_time: Option<Timestamp>,
    /// Routing priority.
    pub priority: OrderPriority,
    /// Provenance.
    pub source: OrderSource,
    /// Trading account.
    pub account_id: Option<AccountId>,
    /// Originating strategy.
    pub strategy_id: Option<StrategyId>,
    /// Originating backtest run.
    pub backtest_id: Option<BacktestId>,
    /// Parent order for algorithmic child slices.
    pub parent_order_id: Option<OrderId>,
    /// Optional per-order position cap consulted by the risk validator.
    pub max_position_size: Option<Quantity>,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
    /// Free-form notes.
    pub notes: String,
}

impl CreateOrderCommand {
    /// A minimal command for the given instrument, used by tests and the
    /// DTO layer as a starting point.
    #[must_use]
    pub fn new(symbol: Symbol, side: OrderSide, order_type: OrderType, quantity: Quantity) -> Self {
        Self {
            symbol,
            side,
            order_type,
            quantity,
            time_in_force: TimeInForce::default(),
            expire_time: None,
            priority: OrderPriority::default(),
            source: OrderSource::default(),
            account_id: None,
            strategy_id: None,
            backtest_id: None,
            parent_order_id: None,
            max_position_size: None,
            tags: BTreeSet::new(),
            notes: String::new(),
        }
    }

    /// Validate static shape constraints before any side effect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderSpec` naming the offending field.
    pub fn validate(&self) -> Result<(), OrderError> {
        self.symbol
            .validate()
            .map_err(|e| OrderError::InvalidOrderSpec {
                field: "symbol".to_string(),
                message: e.to_string(),
            })?;

        self.quantity
            .validate_for_order()
            .map_err(|e| OrderError::InvalidOrderSpec {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

        validate_order_type(&self.order_type, self.quantity)?;

        if self.time_in_force.requires_expire_time() {
            match self.expire_time {
                None => {
                    return Err(OrderError::InvalidOrderSpec {
                        field: "expire_time".to_string(),
                        message: "Expire time is required for GTD orders".to_string(),
                    });
                }
                Some(t) if t.is_past() => {
                    return Err(OrderError::InvalidOrderSpec {
                        field: "expire_time".to_string(),
                        message: "Expire time must be in the future".to_string(),
                    });
                }
                Some(_) => {}
            }
        } else if self.expire_time.is_some() {
            return Err(OrderError::InvalidOrderSpec {
                field: "expire_time".to_string(),
                message: "Expire time is only valid for GTD orders".to_string(),
            });
        }

        Ok(())
    }
}

/// Validate an order type's parameters against the order quantity.
fn validate_order_type(order_type: &OrderType, quantity: Quantity) -> Result<(), OrderError> {
    if let Some(price) = order_type.limit_price() {
        price
            .validate_as_price()
            .map_err(|e| OrderError::InvalidOrderSpec {
                field: "price".to_string(),
                message: e.to_string(),
            })?;
    }

    if let Some(stop_price) = order_type.stop_price() {
        stop_price
            .validate_as_price()
            .map_err(|e| OrderError::InvalidOrderSpec {
                field: "stop_price".to_string(),
                message: e.to_string(),
            })?;
    }

    match order_type {
        OrderType::Iceberg {
            display_quantity, ..
        } => {
            if !display_quantity.is_positive() {
                return Err(OrderError::InvalidOrderSpec {
                    field: "iceberg_quantity".to_string(),
                    message: "Iceberg display quantity must be positive".to_string(),
                });
            }
            if *display_quantity >= quantity {
                return Err(OrderError::InvalidOrderSpec {
                    field: "iceberg_quantity".to_string(),
                    message: "Iceberg display quantity must be below the order quantity"
                        .to_string(),
                });
            }
        }
        OrderType::TrailingStop { trail, .. } => match trail {
            TrailOffset::Amount(amount) => {
                amount
                    .validate_as_price()
                    .map_err(|e| OrderError::InvalidOrderSpec {
                        field: "trailing_amount".to_string(),
                        message: e.to_string(),
                    })?;
            }
            TrailOffset::Percent(pct) => {
                if *pct <= Decimal::ZERO || *pct > Decimal::ONE_HUNDRED {
                    return Err(OrderError::InvalidOrderSpec {
                        field: "trailing_percent".to_string(),
                        message: "Trailing percent must be within (0, 100]".to_string(),
                    });
                }
            }
        },
        _ => {}
    }

    Ok(())
}

/// Partial update for an active order.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    /// New total quantity.
    pub quantity: Option<Quantity>,
    /// New limit price (only for types that carry one).
    pub price: Option<Money>,
    /// New stop price (only for types that carry one).
    pub stop_price: Option<Money>,
    /// New time in force.
    pub time_in_force: Option<TimeInForce>,
    /// New routing priority.
    pub priority: Option<OrderPriority>,
    /// New expiry (GTD only).
    pub expire_time: Option<Timestamp>,
    /// Replacement tag set.
    pub tags: Option<BTreeSet<String>>,
    /// Replacement notes.
    pub notes: Option<String>,
}

/// Order aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    uuid: Uuid,
    venue_order_id: Option<VenueOrderId>,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    quantity: Quantity,
    fill_state: FillState,
    time_in_force: TimeInForce,
    expire_time: Option<Timestamp>,
    priority: OrderPriority,
    source: OrderSource,
    account_id: Option<AccountId>,
    strategy_id: Option<StrategyId>,
    backtest_id: Option<BacktestId>,
    parent_order_id: Option<OrderId>,
    max_position_size: Option<Quantity>,
    status: OrderStatus,
    risk_check_passed: bool,
    risk_check_message: String,
    tags: BTreeSet<String>,
    notes: String,
    created_at: Timestamp,
    updated_at: Timestamp,
    submitted_at: Option<Timestamp>,
    accepted_at: Option<Timestamp>,
    filled_at: Option<Timestamp>,
    cancelled_at: Option<Timestamp>,
}

impl Order {
    /// Create a new order in `Pending` status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderSpec` if command validation fails. No side
    /// effect happens before validation passes.
    pub fn new(id: OrderId, cmd: CreateOrderCommand) -> Result<Self, OrderError> {
        cmd.validate()?;

        let now = Timestamp::now();

        Ok(Self {
            id,
            uuid: Uuid::new_v4(),
            venue_order_id: None,
            symbol: cmd.symbol,
            side: cmd.side,
            order_type: cmd.order_type,
            quantity: cmd.quantity,
            fill_state: FillState::empty(),
            time_in_force: cmd.time_in_force,
            expire_time: cmd.expire_time,
            priority: cmd.priority,
            source: cmd.source,
            account_id: cmd.account_id,
            strategy_id: cmd.strategy_id,
            backtest_id: cmd.backtest_id,
            parent_order_id: cmd.parent_order_id,
            max_position_size: cmd.max_position_size,
            status: OrderStatus::Pending,
            risk_check_passed: false,
            risk_check_message: String::new(),
            tags: cmd.tags,
            notes: cmd.notes,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            accepted_at: None,
            filled_at: None,
            cancelled_at: None,
        })
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Internal monotonic id.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// External-safe reference.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Venue-assigned order reference, set on submission.
    #[must_use]
    pub const fn venue_order_id(&self) -> Option<&VenueOrderId> {
        self.venue_order_id.as_ref()
    }

    /// Traded symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Order type with parameters.
    #[must_use]
    pub const fn order_type(&self) -> &OrderType {
        &self.order_type
    }

    /// Total order quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Fill aggregation state.
    #[must_use]
    pub const fn fill_state(&self) -> &FillState {
        &self.fill_state
    }

    /// Time in force.
    #[must_use]
    pub const fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// GTD expiry.
    #[must_use]
    pub const fn expire_time(&self) -> Option<Timestamp> {
        self.expire_time
    }

    /// Routing priority.
    #[must_use]
    pub const fn priority(&self) -> OrderPriority {
        self.priority
    }

    /// Provenance.
    #[must_use]
    pub const fn source(&self) -> OrderSource {
        self.source
    }

    /// Trading account.
    #[must_use]
    pub const fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    /// Originating strategy.
    #[must_use]
    pub const fn strategy_id(&self) -> Option<&StrategyId> {
        self.strategy_id.as_ref()
    }

    /// Originating backtest run.
    #[must_use]
    pub const fn backtest_id(&self) -> Option<&BacktestId> {
        self.backtest_id.as_ref()
    }

    /// Parent order for child slices.
    #[must_use]
    pub const fn parent_order_id(&self) -> Option<OrderId> {
        self.parent_order_id
    }

    /// Per-order position cap.
    #[must_use]
    pub const fn max_position_size(&self) -> Option<Quantity> {
        self.max_position_size
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Whether the pre-trade risk check passed.
    #[must_use]
    pub const fn risk_check_passed(&self) -> bool {
        self.risk_check_passed
    }

    /// Risk check or rejection message.
    #[must_use]
    pub fn risk_check_message(&self) -> &str {
        &self.risk_check_message
    }

    /// Free-form tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Free-form notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// When the order was routed to a venue.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<Timestamp> {
        self.submitted_at
    }

    /// When the venue acknowledged the order.
    #[must_use]
    pub const fn accepted_at(&self) -> Option<Timestamp> {
        self.accepted_at
    }

    /// When the order was completely filled.
    #[must_use]
    pub const fn filled_at(&self) -> Option<Timestamp> {
        self.filled_at
    }

    /// When the order was cancelled.
    #[must_use]
    pub const fn cancelled_at(&self) -> Option<Timestamp> {
        self.cancelled_at
    }

    // ========================================================================
    // Derived state (pure functions of stored fields)
    // ========================================================================

    /// Cumulative filled quantity.
    #[must_use]
    pub fn filled_quantity(&self) -> Quantity {
        self.fill_state.filled_quantity()
    }

    /// Quantity still open for execution.
    #[must_use]
    pub fn remaining_quantity(&self) -> Quantity {
        self.quantity.saturating_sub(self.filled_quantity())
    }

    /// Filled fraction in [0, 1]; guarded against a zero quantity.
    #[must_use]
    pub fn fill_ratio(&self) -> Decimal {
        if self.quantity.amount() > Decimal::ZERO {
            self.filled_quantity().amount() / self.quantity.amount()
        } else {
            Decimal::ZERO
        }
    }

    /// Quantity-weighted mean fill price.
    #[must_use]
    pub fn avg_fill_price(&self) -> Money {
        self.fill_state.avg_fill_price()
    }

    /// Accumulated commission.
    #[must_use]
    pub fn commission(&self) -> Money {
        self.fill_state.commission()
    }

    /// Notional value: quantity x average fill price, once fills exist.
    #[must_use]
    pub fn total_value(&self) -> Option<Money> {
        if self.filled_quantity().is_positive() {
            Some(Money::new(
                self.quantity.amount() * self.avg_fill_price().amount(),
            ))
        } else {
            None
        }
    }

    /// Whether the order is still active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether a GTD order is past its expiry.
    #[must_use]
    pub fn is_expiry_due(&self) -> bool {
        self.time_in_force.requires_expire_time()
            && !self.status.is_terminal()
            && self.expire_time.is_some_and(|t| t.is_past())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Record the outcome of a pre-trade risk check.
    pub fn set_risk_result(&mut self, passed: bool, message: impl Into<String>) {
        self.risk_check_passed = passed;
        self.risk_check_message = message.into();
        self.touch();
    }

    /// Apply a partial update to an active order.
    ///
    /// Either every part of the patch applies or none of it does.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotEditable` for non-active orders,
    /// `QuantityBelowFilled` when the new quantity drops below the filled
    /// quantity, and `InvalidOrderSpec` for fields incompatible with the
    /// order's type or time in force.
    pub fn apply_update(&mut self, patch: OrderPatch) -> Result<(), OrderError> {
        if !self.status.is_active() {
            return Err(OrderError::OrderNotEditable {
                status: self.status,
            });
        }

        // Stage everything before committing so a late validation failure
        // leaves the order untouched.
        let new_quantity = match patch.quantity {
            Some(q) => {
                q.validate_for_order()
                    .map_err(|e| OrderError::InvalidOrderSpec {
                        field: "quantity".to_string(),
                        message: e.to_string(),
                    })?;
                if q < self.filled_quantity() {
                    return Err(OrderError::QuantityBelowFilled {
                        requested: q.to_string(),
                        filled: self.filled_quantity().to_string(),
                    });
                }
                q
            }
            None => self.quantity,
        };

        let mut new_order_type = self.order_type;
        if let Some(price) = patch.price {
            new_order_type = reprice(new_order_type, price)?;
        }
        if let Some(stop_price) = patch.stop_price {
            new_order_type = restop(new_order_type, stop_price)?;
        }
        validate_order_type(&new_order_type, new_quantity)?;

        let new_tif = patch.time_in_force.unwrap_or(self.time_in_force);
        let new_expire = if new_tif.requires_expire_time() {
            let expire = patch.expire_time.or(self.expire_time).ok_or_else(|| {
                OrderError::InvalidOrderSpec {
                    field: "expire_time".to_string(),
                    message: "Expire time is required for GTD orders".to_string(),
                }
            })?;
            if patch.expire_time.is_some() && expire.is_past() {
                return Err(OrderError::InvalidOrderSpec {
                    field: "expire_time".to_string(),
                    message: "Expire time must be in the future".to_string(),
                });
            }
            Some(expire)
        } else {
            if patch.expire_time.is_some() {
                return Err(OrderError::InvalidOrderSpec {
                    field: "expire_time".to_string(),
                    message: "Expire time is only valid for GTD orders".to_string(),
                });
            }
            None
        };

        self.quantity = new_quantity;
        self.order_type = new_order_type;
        self.time_in_force = new_tif;
        self.expire_time = new_expire;
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.touch();

        Ok(())
    }

    /// Mark the order as routed to a venue.
    ///
    /// # Errors
    ///
    /// Returns `RiskCheckNotPassed` if the risk gate has not passed, or an
    /// invalid-transition error if the order is not `Pending`.
    pub fn mark_submitted(&mut self, venue_order_id: VenueOrderId) -> Result<(), OrderError> {
        if !self.risk_check_passed {
            return Err(OrderError::RiskCheckNotPassed);
        }
        OrderStateMachine::validate_transition(self.status, OrderStatus::Submitted)?;

        self.status = OrderStatus::Submitted;
        self.venue_order_id = Some(venue_order_id);
        if self.submitted_at.is_none() {
            self.submitted_at = Some(Timestamp::now());
        }
        self.touch();

        Ok(())
    }

    /// Mark the order as acknowledged by the venue.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not `Submitted`.
    pub fn mark_accepted(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Accepted)?;

        self.status = OrderStatus::Accepted;
        if self.accepted_at.is_none() {
            self.accepted_at = Some(Timestamp::now());
        }
        self.touch();

        Ok(())
    }

    /// Record a fill against this order.
    ///
    /// # Errors
    ///
    /// Returns `OverFill` if the fill exceeds the remaining quantity, or an
    /// invalid-transition error if the order cannot receive fills.
    pub fn record_fill(&mut self, fill: Fill) -> Result<(), OrderError> {
        if !self.status.can_fill() {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::PartiallyFilled,
                reason: format!("Order cannot receive fills in status {}", self.status),
            });
        }

        let fill_quantity = fill.quantity;
        if fill_quantity > self.remaining_quantity() {
            return Err(OrderError::OverFill {
                fill_quantity: fill_quantity.to_string(),
                remaining: self.remaining_quantity().to_string(),
            });
        }

        let remaining = self.remaining_quantity();
        self.fill_state
            .apply(fill, self.quantity)
            .map_err(|_| OrderError::OverFill {
                fill_quantity: fill_quantity.to_string(),
                remaining: remaining.to_string(),
            })?;

        if self.remaining_quantity().is_zero() {
            self.status = OrderStatus::Filled;
            if self.filled_at.is_none() {
                self.filled_at = Some(Timestamp::now());
            }
        } else {
            self.status = OrderStatus::PartiallyFilled;
        }
        self.touch();

        Ok(())
    }

    /// Cancel the order.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotEditable` if the order is in a state that cannot
    /// be cancelled.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if OrderStateMachine::validate_transition(self.status, OrderStatus::Cancelled).is_err() {
            return Err(OrderError::OrderNotEditable {
                status: self.status,
            });
        }

        self.status = OrderStatus::Cancelled;
        if self.cancelled_at.is_none() {
            self.cancelled_at = Some(Timestamp::now());
        }
        self.touch();

        Ok(())
    }

    /// Reject the order, recording the venue or validation reason.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not `Submitted` or `Accepted`.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Rejected)?;

        self.status = OrderStatus::Rejected;
        self.risk_check_message = reason.into();
        self.touch();

        Ok(())
    }

    /// Expire the order (scheduled GTD check).
    ///
    /// # Errors
    ///
    /// Returns error if the order is already terminal.
    pub fn expire(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Expired)?;

        self.status = OrderStatus::Expired;
        self.touch();

        Ok(())
    }

    /// Administratively pause the order.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Accepted` or `PartiallyFilled`.
    pub fn suspend(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Suspended)?;

        self.status = OrderStatus::Suspended;
        self.touch();

        Ok(())
    }

    /// Resume a suspended order back to `Accepted`.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not `Suspended`.
    pub fn resume(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Suspended {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Accepted,
                reason: "Only suspended orders can be resumed".to_string(),
            });
        }

        self.status = OrderStatus::Accepted;
        self.touch();

        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// Replace the limit price on an order type that carries one.
fn reprice(order_type: OrderType, price: Money) -> Result<OrderType, OrderError> {
    match order_type {
        OrderType::Limit { .. } => Ok(OrderType::Limit { price }),
        OrderType::StopLimit { stop_price, .. } => Ok(OrderType::StopLimit { price, stop_price }),
        OrderType::Iceberg {
            display_quantity, ..
        } => Ok(OrderType::Iceberg {
            price: Some(price),
            display_quantity,
        }),
        OrderType::Twap { .. } => Ok(OrderType::Twap { price: Some(price) }),
        OrderType::Vwap { .. } => Ok(OrderType::Vwap { price: Some(price) }),
        OrderType::Market | OrderType::Stop { .. } | OrderType::TrailingStop { .. } => {
            Err(OrderError::InvalidOrderSpec {
                field: "price".to_string(),
                message: format!("{} orders do not carry a limit price", order_type.kind()),
            })
        }
    }
}

/// Replace the stop price on an order type that carries one.
fn restop(order_type: OrderType, stop_price: Money) -> Result<OrderType, OrderError> {
    match order_type {
        OrderType::Stop { .. } => Ok(OrderType::Stop { stop_price }),
        OrderType::StopLimit { price, .. } => Ok(OrderType::StopLimit { price, stop_price }),
        OrderType::TrailingStop { trail, .. } => Ok(OrderType::TrailingStop { stop_price, trail }),
        _ => Err(OrderError::InvalidOrderSpec {
            field: "stop_price".to_string(),
            message: format!("{} orders do not carry a stop price", order_type.kind()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::FillId;

    fn limit_buy(quantity: i64, price: f64) -> CreateOrderCommand {
        CreateOrderCommand::new(
            Symbol::new("NASDAQ:AAPL"),
            OrderSide::Buy,
            OrderType::Limit {
                price: Money::from_f64(price),
            },
            Quantity::from_i64(quantity),
        )
    }

    fn make_order(cmd: CreateOrderCommand) -> Order {
        Order::new(OrderId::new(1), cmd).unwrap()
    }

    fn make_fill(id: i64, qty: i64, price: f64) -> Fill {
        Fill::new(
            FillId::new(id),
            OrderId::new(1),
            Quantity::from_i64(qty),
            Money::from_f64(price),
            Timestamp::now(),
        )
    }

    fn routed_order(cmd: CreateOrderCommand) -> Order {
        let mut order = make_order(cmd);
        order.set_risk_result(true, "");
        order.mark_submitted(VenueOrderId::new("v-1")).unwrap();
        order.mark_accepted().unwrap();
        order
    }

    #[test]
    fn new_order_starts_pending_with_creation_timestamps_only() {
        let order = make_order(limit_buy(10, 100.0));

        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(!order.risk_check_passed());
        assert!(order.submitted_at().is_none());
        assert!(order.accepted_at().is_none());
        assert!(order.filled_at().is_none());
        assert!(order.cancelled_at().is_none());
        assert_eq!(order.filled_quantity(), Quantity::ZERO);
        assert_eq!(order.remaining_quantity(), Quantity::from_i64(10));
    }

    #[test]
    fn iceberg_display_quantity_must_be_below_order_quantity() {
        let cmd = CreateOrderCommand::new(
            Symbol::new("NASDAQ:AAPL"),
            OrderSide::Buy,
            OrderType::Iceberg {
                price: Some(Money::from_f64(100.0)),
                display_quantity: Quantity::from_i64(150),
            },
            Quantity::from_i64(100),
        );

        let err = Order::new(OrderId::new(1), cmd).unwrap_err();
        match err {
            OrderError::InvalidOrderSpec { field, .. } => {
                assert_eq!(field, "iceberg_quantity");
            }
            other => panic!("expected InvalidOrderSpec, got {other:?}"),
        }
    }

    #[test]
    fn gtd_requires_future_expire_time() {
        let mut cmd = limit_buy(10, 100.0);
        cmd.time_in_force = TimeInForce::Gtd;

        assert!(Order::new(OrderId::new(1), cmd.clone()).is_err());

        cmd.expire_time = Some(Timestamp::parse("2000-01-01T00:00:00Z").unwrap());
        assert!(Order::new(OrderId::new(1), cmd.clone()).is_err());

        cmd.expire_time = Some(Timestamp::parse("2999-01-01T00:00:00Z").unwrap());
        assert!(Order::new(OrderId::new(1), cmd).is_ok());
    }

    #[test]
    fn expire_time_rejected_for_non_gtd() {
        let mut cmd = limit_buy(10, 100.0);
        cmd.expire_time = Some(Timestamp::parse("2999-01-01T00:00:00Z").unwrap());

        assert!(Order::new(OrderId::new(1), cmd).is_err());
    }

    #[test]
    fn negative_limit_price_rejected() {
        let cmd = CreateOrderCommand::new(
            Symbol::new("NASDAQ:AAPL"),
            OrderSide::Buy,
            OrderType::Limit {
                price: Money::from_f64(-5.0),
            },
            Quantity::from_i64(10),
        );
        assert!(Order::new(OrderId::new(1), cmd).is_err());
    }

    #[test]
    fn submit_requires_risk_pass() {
        let mut order = make_order(limit_buy(10, 100.0));

        let err = order.mark_submitted(VenueOrderId::new("v-1")).unwrap_err();
        assert_eq!(err, OrderError::RiskCheckNotPassed);
        assert_eq!(order.status(), OrderStatus::Pending);

        order.set_risk_result(true, "");
        order.mark_submitted(VenueOrderId::new("v-1")).unwrap();
        assert_eq!(order.status(), OrderStatus::Submitted);
        assert!(order.submitted_at().is_some());
        assert_eq!(order.venue_order_id().unwrap().as_str(), "v-1");
    }

    #[test]
    fn fill_sequence_partial_then_complete() {
        let mut order = routed_order(limit_buy(10, 100.0));

        order.record_fill(make_fill(1, 4, 99.0)).unwrap();
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert_eq!(order.filled_quantity(), Quantity::from_i64(4));
        assert_eq!(order.avg_fill_price(), Money::from_f64(99.0));
        assert!(order.filled_at().is_none());

        order.record_fill(make_fill(2, 6, 101.0)).unwrap();
        assert_eq!(order.status(), OrderStatus::Filled);
        assert_eq!(order.filled_quantity(), Quantity::from_i64(10));
        assert_eq!(order.avg_fill_price(), Money::from_f64(100.2));
        assert!(order.filled_at().is_some());
    }

    #[test]
    fn overfill_rejected_and_state_unchanged() {
        let mut order = routed_order(limit_buy(10, 100.0));
        order.record_fill(make_fill(1, 6, 100.0)).unwrap();

        let err = order.record_fill(make_fill(2, 5, 100.0)).unwrap_err();
        assert!(matches!(err, OrderError::OverFill { .. }));
        assert_eq!(order.filled_quantity(), Quantity::from_i64(6));
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn fill_rejected_before_acceptance() {
        let mut order = make_order(limit_buy(10, 100.0));
        assert!(order.record_fill(make_fill(1, 5, 100.0)).is_err());
    }

    #[test]
    fn update_quantity_to_exactly_filled_succeeds_without_autofill() {
        let mut order = routed_order(limit_buy(10, 100.0));
        order.record_fill(make_fill(1, 4, 100.0)).unwrap();

        order
            .apply_update(OrderPatch {
                quantity: Some(Quantity::from_i64(4)),
                ..OrderPatch::default()
            })
            .unwrap();

        assert_eq!(order.quantity(), Quantity::from_i64(4));
        assert_eq!(order.remaining_quantity(), Quantity::ZERO);
        // The update alone never completes the order.
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn update_quantity_below_filled_fails() {
        let mut order = routed_order(limit_buy(10, 100.0));
        order.record_fill(make_fill(1, 4, 100.0)).unwrap();

        let err = order
            .apply_update(OrderPatch {
                quantity: Some(Quantity::from_i64(3)),
                ..OrderPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, OrderError::QuantityBelowFilled { .. }));
        assert_eq!(order.quantity(), Quantity::from_i64(10));
    }

    #[test]
    fn update_rejected_for_terminal_order() {
        let mut order = routed_order(limit_buy(10, 100.0));
        order.record_fill(make_fill(1, 10, 100.0)).unwrap();

        let err = order
            .apply_update(OrderPatch {
                notes: Some("too late".to_string()),
                ..OrderPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotEditable { .. }));
    }

    #[test]
    fn update_price_on_market_order_rejected() {
        let cmd = CreateOrderCommand::new(
            Symbol::new("NASDAQ:AAPL"),
            OrderSide::Buy,
            OrderType::Market,
            Quantity::from_i64(10),
        );
        let mut order = make_order(cmd);

        let err = order
            .apply_update(OrderPatch {
                price: Some(Money::from_f64(101.0)),
                ..OrderPatch::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidOrderSpec { ref field, .. } if field == "price"
        ));
    }

    #[test]
    fn update_price_and_stop_price_on_stop_limit() {
        let cmd = CreateOrderCommand::new(
            Symbol::new("NASDAQ:AAPL"),
            OrderSide::Sell,
            OrderType::StopLimit {
                price: Money::from_f64(95.0),
                stop_price: Money::from_f64(96.0),
            },
            Quantity::from_i64(10),
        );
        let mut order = make_order(cmd);

        order
            .apply_update(OrderPatch {
                price: Some(Money::from_f64(94.0)),
                stop_price: Some(Money::from_f64(95.5)),
                ..OrderPatch::default()
            })
            .unwrap();

        assert_eq!(order.order_type().limit_price(), Some(Money::from_f64(94.0)));
        assert_eq!(
            order.order_type().stop_price(),
            Some(Money::from_f64(95.5))
        );
    }

    #[test]
    fn update_tif_to_gtd_requires_expire_time() {
        let mut order = make_order(limit_buy(10, 100.0));

        let err = order
            .apply_update(OrderPatch {
                time_in_force: Some(TimeInForce::Gtd),
                ..OrderPatch::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidOrderSpec { ref field, .. } if field == "expire_time"
        ));

        order
            .apply_update(OrderPatch {
                time_in_force: Some(TimeInForce::Gtd),
                expire_time: Some(Timestamp::parse("2999-01-01T00:00:00Z").unwrap()),
                ..OrderPatch::default()
            })
            .unwrap();
        assert_eq!(order.time_in_force(), TimeInForce::Gtd);
    }

    #[test]
    fn failed_update_leaves_order_untouched() {
        let mut order = make_order(limit_buy(10, 100.0));
        let before = order.clone();

        // Valid quantity but an invalid price edit; nothing may apply.
        let result = order.apply_update(OrderPatch {
            quantity: Some(Quantity::from_i64(20)),
            stop_price: Some(Money::from_f64(90.0)),
            ..OrderPatch::default()
        });
        assert!(result.is_err());
        assert_eq!(order.quantity(), before.quantity());
        assert_eq!(order.order_type(), before.order_type());
    }

    #[test]
    fn cancel_preserves_partial_fills() {
        let mut order = routed_order(limit_buy(10, 100.0));
        order.record_fill(make_fill(1, 4, 100.0)).unwrap();

        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.filled_quantity(), Quantity::from_i64(4));
        assert!(order.cancelled_at().is_some());
    }

    #[test]
    fn cancel_filled_order_is_not_editable() {
        let mut order = routed_order(limit_buy(10, 100.0));
        order.record_fill(make_fill(1, 10, 100.0)).unwrap();
        let before = order.clone();

        let err = order.cancel().unwrap_err();
        assert!(matches!(err, OrderError::OrderNotEditable { .. }));
        assert_eq!(order, before);
    }

    #[test]
    fn reject_records_reason() {
        let mut order = make_order(limit_buy(10, 100.0));
        order.set_risk_result(true, "");
        order.mark_submitted(VenueOrderId::new("v-1")).unwrap();

        order.reject("venue says no").unwrap();
        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(order.risk_check_message(), "venue says no");
    }

    #[test]
    fn suspend_and_resume() {
        let mut order = routed_order(limit_buy(10, 100.0));

        order.suspend().unwrap();
        assert_eq!(order.status(), OrderStatus::Suspended);

        order.resume().unwrap();
        assert_eq!(order.status(), OrderStatus::Accepted);
    }

    #[test]
    fn suspend_rejected_for_pending_order() {
        let mut order = make_order(limit_buy(10, 100.0));
        assert!(order.suspend().is_err());
    }

    #[test]
    fn expiry_due_only_for_gtd_past_expiry() {
        let mut cmd = limit_buy(10, 100.0);
        cmd.time_in_force = TimeInForce::Gtd;
        cmd.expire_time = Some(Timestamp::parse("2999-01-01T00:00:00Z").unwrap());
        let order = make_order(cmd);
        assert!(!order.is_expiry_due());

        let day_order = make_order(limit_buy(10, 100.0));
        assert!(!day_order.is_expiry_due());
    }

    #[test]
    fn total_value_is_none_until_first_fill() {
        let mut order = routed_order(limit_buy(10, 100.0));
        assert!(order.total_value().is_none());

        order.record_fill(make_fill(1, 10, 100.0)).unwrap();
        assert_eq!(order.total_value(), Some(Money::from_f64(1000.0)));
    }

    #[test]
    fn fill_ratio_progression() {
        let mut order = routed_order(limit_buy(10, 100.0));
        assert_eq!(order.fill_ratio(), Decimal::ZERO);

        order.record_fill(make_fill(1, 4, 100.0)).unwrap();
        assert_eq!(order.fill_ratio(), Decimal::new(4, 1)); // 0.4

        order.record_fill(make_fill(2, 6, 100.0)).unwrap();
        assert_eq!(order.fill_ratio(), Decimal::ONE);
    }

    #[test]
    fn serde_roundtrip_field_for_field() {
        let mut cmd = limit_buy(10, 100.0);
        cmd.tags = ["swing".to_string(), "tech".to_string()].into();
        cmd.strategy_id = Some(StrategyId::new("strat-9"));
        let mut order = make_order(cmd);
        order.set_risk_result(true, "ok");

        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, order);
    }
}
