//! Mock venue connector.
//!
//! Simulates an external trading system with deterministic fills, for
//! tests and demo wiring. No network, no randomness: the same sequence of
//! calls always produces the same fills.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    ExecutionReport, VenueConnector, VenueError, VenueOrderSnapshot, VenueOrderStatus,
    VenueSubmitRequest,
};
use crate::domain::orders::value_objects::{LiquidityType, TimeInForce};
use crate::domain::shared::{AccountId, Money, Quantity, Timestamp, VenueOrderId};

/// How the mock venue fills orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFillMode {
    /// Full fill on the first status query.
    Immediate,
    /// One equal slice per status query until complete.
    Sliced(u32),
    /// Accept and rest without filling.
    Resting,
}

#[derive(Debug)]
struct SimOrder {
    request: VenueSubmitRequest,
    filled: Quantity,
    fills: Vec<ExecutionReport>,
    status: VenueOrderStatus,
    reject_reason: Option<String>,
}

/// Deterministic in-process venue.
pub struct MockVenueConnector {
    venue_name: String,
    account_id: AccountId,
    connected: AtomicBool,
    reject_submits: AtomicBool,
    fill_mode: MockFillMode,
    /// Price used when an order carries no limit price.
    mark_price: Money,
    order_counter: AtomicU64,
    orders: Mutex<HashMap<String, SimOrder>>,
}

impl MockVenueConnector {
    /// Create a connected mock venue that fills orders immediately.
    #[must_use]
    pub fn new(venue_name: impl Into<String>, account_id: AccountId) -> Self {
        Self {
            venue_name: venue_name.into(),
            account_id,
            connected: AtomicBool::new(true),
            reject_submits: AtomicBool::new(false),
            fill_mode: MockFillMode::Immediate,
            mark_price: Money::from_units(100),
            order_counter: AtomicU64::new(0),
            orders: Mutex::new(HashMap::new()),
        }
    }

    /// Choose the fill behavior.
    #[must_use]
    pub const fn with_fill_mode(mut self, mode: MockFillMode) -> Self {
        self.fill_mode = mode;
        self
    }

    /// Price assumed for orders without a limit price.
    #[must_use]
    pub const fn with_mark_price(mut self, mark_price: Money) -> Self {
        self.mark_price = mark_price;
        self
    }

    /// Toggle the simulated venue session.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make subsequent submits fail with a rejection.
    pub fn set_reject_submits(&self, reject: bool) {
        self.reject_submits.store(reject, Ordering::SeqCst);
    }

    fn fill_price(&self, request: &VenueSubmitRequest) -> Money {
        request.order_type.limit_price().unwrap_or(self.mark_price)
    }

    /// Advance one simulation step for an order and return its snapshot.
    fn step(&self, sim: &mut SimOrder, venue_order_id: &str) {
        if sim.status != VenueOrderStatus::Accepted
            && sim.status != VenueOrderStatus::PartiallyFilled
        {
            return;
        }

        let total = sim.request.quantity;
        let price = self.fill_price(&sim.request);
        let tif = sim.request.time_in_force;

        let slice = match self.fill_mode {
            MockFillMode::Resting => {
                // FOK cannot rest: reject instead of sitting unfilled.
                if tif == TimeInForce::Fok {
                    sim.status = VenueOrderStatus::Rejected;
                    sim.reject_reason = Some("cannot fill FOK order completely".to_string());
                } else if tif == TimeInForce::Ioc {
                    sim.status = VenueOrderStatus::Cancelled;
                }
                return;
            }
            MockFillMode::Immediate => total - sim.filled,
            MockFillMode::Sliced(n) => {
                let n = n.max(1);
                let per_slice = Quantity::new(
                    (total.amount() / Decimal::from(n)).round_dp(8),
                );
                let remaining = total - sim.filled;
                if per_slice >= remaining || sim.fills.len() as u32 + 1 >= n {
                    remaining
                } else {
                    per_slice
                }
            }
        };

        if slice.is_positive() {
            sim.fills.push(ExecutionReport {
                external_fill_id: format!("{}-fill-{}", venue_order_id, sim.fills.len() + 1),
                quantity: slice,
                price,
                commission: Money::ZERO,
                commission_asset: None,
                liquidity: LiquidityType::Taker,
                counterparty: None,
                fill_time: Timestamp::now(),
            });
            sim.filled = sim.filled + slice;
        }

        if sim.filled >= total {
            sim.status = VenueOrderStatus::Filled;
        } else {
            // Immediate styles never rest on a partial outcome.
            match tif {
                TimeInForce::Ioc => sim.status = VenueOrderStatus::Cancelled,
                TimeInForce::Fok => {
                    // All-or-nothing: roll the partial back.
                    sim.fills.clear();
                    sim.filled = Quantity::ZERO;
                    sim.status = VenueOrderStatus::Rejected;
                    sim.reject_reason = Some("cannot fill FOK order completely".to_string());
                }
                _ => sim.status = VenueOrderStatus::PartiallyFilled,
            }
        }
    }

    fn snapshot(sim: &SimOrder, venue_order_id: &str) -> VenueOrderSnapshot {
        VenueOrderSnapshot {
            venue_order_id: VenueOrderId::new(venue_order_id),
            status: sim.status,
            reject_reason: sim.reject_reason.clone(),
            fills: sim.fills.clone(),
        }
    }
}

#[async_trait]
impl VenueConnector for MockVenueConnector {
    fn venue_name(&self) -> &str {
        &self.venue_name
    }

    fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn submit(&self, request: &VenueSubmitRequest) -> Result<VenueOrderId, VenueError> {
        if !self.is_connected() {
            return Err(VenueError::Disconnected {
                venue: self.venue_name.clone(),
            });
        }
        if self.reject_submits.load(Ordering::SeqCst) {
            return Err(VenueError::Rejected {
                reason: "mock venue is rejecting submissions".to_string(),
            });
        }

        let seq = self.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let venue_order_id = format!("{}-{}", self.venue_name, seq);

        let mut orders = self.orders.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        orders.insert(
            venue_order_id.clone(),
            SimOrder {
                request: request.clone(),
                filled: Quantity::ZERO,
                fills: Vec::new(),
                status: VenueOrderStatus::Accepted,
                reject_reason: None,
            },
        );

        Ok(VenueOrderId::new(venue_order_id))
    }

    async fn cancel(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError> {
        if !self.is_connected() {
            return Err(VenueError::Disconnected {
                venue: self.venue_name.clone(),
            });
        }

        let mut orders = self.orders.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let sim = orders
            .get_mut(venue_order_id.as_str())
            .ok_or_else(|| VenueError::OrderNotFound(venue_order_id.as_str().to_string()))?;

        if sim.status == VenueOrderStatus::Filled {
            return Err(VenueError::Api {
                message: "order already filled".to_string(),
            });
        }
        sim.status = VenueOrderStatus::Cancelled;
        Ok(())
    }

    async fn query_status(
        &self,
        venue_order_id: &VenueOrderId,
    ) -> Result<VenueOrderSnapshot, VenueError> {
        if !self.is_connected() {
            return Err(VenueError::Disconnected {
                venue: self.venue_name.clone(),
            });
        }

        let mut orders = self.orders.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let sim = orders
            .get_mut(venue_order_id.as_str())
            .ok_or_else(|| VenueError::OrderNotFound(venue_order_id.as_str().to_string()))?;

        self.step(sim, venue_order_id.as_str());
        Ok(Self::snapshot(sim, venue_order_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orders::value_objects::{OrderPriority, OrderSide, OrderType};
    use crate::domain::shared::{OrderId, Symbol};

    fn make_request(quantity: i64, tif: TimeInForce) -> VenueSubmitRequest {
        VenueSubmitRequest {
            order_id: OrderId::new(1),
            symbol: Symbol::new("NASDAQ:AAPL"),
            side: OrderSide::Buy,
            order_type: OrderType::Limit {
                price: Money::from_f64(100.0),
            },
            quantity: Quantity::from_i64(quantity),
            time_in_force: tif,
            expire_time: None,
            priority: OrderPriority::Normal,
        }
    }

    fn mock() -> MockVenueConnector {
        MockVenueConnector::new("mock", AccountId::new("acct-1"))
    }

    #[tokio::test]
    async fn submit_assigns_sequential_references() {
        let venue = mock();
        let a = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();
        let b = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();

        assert_eq!(a.as_str(), "mock-1");
        assert_eq!(b.as_str(), "mock-2");
    }

    #[tokio::test]
    async fn immediate_mode_fills_on_first_query() {
        let venue = mock();
        let id = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();

        let snapshot = venue.query_status(&id).await.unwrap();
        assert_eq!(snapshot.status, VenueOrderStatus::Filled);
        assert_eq!(snapshot.fills.len(), 1);
        assert_eq!(snapshot.fills[0].quantity, Quantity::from_i64(10));
        assert_eq!(snapshot.fills[0].price, Money::from_f64(100.0));
    }

    #[tokio::test]
    async fn sliced_mode_fills_one_slice_per_query() {
        let venue = mock().with_fill_mode(MockFillMode::Sliced(2));
        let id = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();

        let first = venue.query_status(&id).await.unwrap();
        assert_eq!(first.status, VenueOrderStatus::PartiallyFilled);
        assert_eq!(first.fills.len(), 1);
        assert_eq!(first.fills[0].quantity, Quantity::from_i64(5));

        let second = venue.query_status(&id).await.unwrap();
        assert_eq!(second.status, VenueOrderStatus::Filled);
        assert_eq!(second.fills.len(), 2);
    }

    #[tokio::test]
    async fn fills_are_deterministic_and_stable_across_queries() {
        let venue = mock();
        let id = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();

        let first = venue.query_status(&id).await.unwrap();
        let second = venue.query_status(&id).await.unwrap();

        // Cumulative list with stable external ids; no double emission.
        assert_eq!(first.fills, second.fills);
        assert_eq!(second.fills[0].external_fill_id, "mock-1-fill-1");
    }

    #[tokio::test]
    async fn ioc_cancels_leftover_in_sliced_mode() {
        let venue = mock().with_fill_mode(MockFillMode::Sliced(4));
        let id = venue.submit(&make_request(10, TimeInForce::Ioc)).await.unwrap();

        let snapshot = venue.query_status(&id).await.unwrap();
        assert_eq!(snapshot.status, VenueOrderStatus::Cancelled);
        assert!(!snapshot.fills.is_empty());
    }

    #[tokio::test]
    async fn fok_rejects_without_fills_in_sliced_mode() {
        let venue = mock().with_fill_mode(MockFillMode::Sliced(4));
        let id = venue.submit(&make_request(10, TimeInForce::Fok)).await.unwrap();

        let snapshot = venue.query_status(&id).await.unwrap();
        assert_eq!(snapshot.status, VenueOrderStatus::Rejected);
        assert!(snapshot.fills.is_empty());
        assert!(snapshot.reject_reason.is_some());
    }

    #[tokio::test]
    async fn resting_mode_never_fills() {
        let venue = mock().with_fill_mode(MockFillMode::Resting);
        let id = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();

        let snapshot = venue.query_status(&id).await.unwrap();
        assert_eq!(snapshot.status, VenueOrderStatus::Accepted);
        assert!(snapshot.fills.is_empty());
    }

    #[tokio::test]
    async fn cancel_resting_order() {
        let venue = mock().with_fill_mode(MockFillMode::Resting);
        let id = venue.submit(&make_request(10, TimeInForce::Day)).await.unwrap();

        venue.cancel(&id).await.unwrap();
        let snapshot = venue.query_status(&id).await.unwrap();
        assert_eq!(snapshot.status, VenueOrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn disconnected_venue_refuses_calls() {
        let venue = mock();
        venue.set_connected(false);
        assert!(!venue.is_connected());

        let err = venue
            .submit(&make_request(10, TimeInForce::Day))
            .await
            .unwrap_err();
        assert!(matches!(err, VenueError::Disconnected { .. }));
    }

    #[tokio::test]
    async fn reject_submits_flag() {
        let venue = mock();
        venue.set_reject_submits(true);

        let err = venue
            .submit(&make_request(10, TimeInForce::Day))
            .await
            .unwrap_err();
        assert!(matches!(err, VenueError::Rejected { .. }));
    }

    #[tokio::test]
    async fn market_order_fills_at_mark_price() {
        let venue = mock().with_mark_price(Money::from_f64(42.0));
        let request = VenueSubmitRequest {
            order_type: OrderType::Market,
            ..make_request(10, TimeInForce::Day)
        };
        let id = venue.submit(&request).await.unwrap();

        let snapshot = venue.query_status(&id).await.unwrap();
        assert_eq!(snapshot.fills[0].price, Money::from_f64(42.0));
    }

    #[tokio::test]
    async fn unknown_order_reference() {
        let venue = mock();
        let err = venue
            .query_status(&VenueOrderId::new("mock-999"))
            .await
            .unwrap_err();
        assert!(matches!(err, VenueError::OrderNotFound(_)));
    }
}
