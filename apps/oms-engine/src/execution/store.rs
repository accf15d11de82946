//! The order table.
//!
//! Single shared mutable resource of the engine. Orders live behind a
//! per-order async mutex so that no two operations can transition the same
//! order concurrently, while operations on different orders proceed in
//! parallel. Internal ids are allocated monotonically here.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::orders::aggregate::{CreateOrderCommand, Order};
use crate::domain::orders::errors::OrderError;
use crate::domain::orders::value_objects::{Fill, OrderKind, OrderSide, OrderStatus};
use crate::domain::risk::RecentOrder;
use crate::domain::shared::{FillId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp};

/// Sort key for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Creation time (default).
    CreatedAt,
    /// Last update time.
    UpdatedAt,
    /// Order quantity.
    Quantity,
    /// Limit price (orders without one sort first).
    Price,
}

impl Default for SortBy {
    fn default() -> Self {
        Self::CreatedAt
    }
}

/// Sort direction for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Desc
    }
}

/// Filter, sort, and pagination parameters for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Match this symbol.
    pub symbol: Option<Symbol>,
    /// Match this order type.
    pub kind: Option<OrderKind>,
    /// Match this side.
    pub side: Option<OrderSide>,
    /// Match this status.
    pub status: Option<OrderStatus>,
    /// Match this strategy.
    pub strategy_id: Option<StrategyId>,
    /// Require this tag.
    pub tag: Option<String>,
    /// Created at or after.
    pub created_from: Option<Timestamp>,
    /// Created at or before.
    pub created_to: Option<Timestamp>,
    /// Minimum quantity.
    pub min_quantity: Option<Quantity>,
    /// Maximum quantity.
    pub max_quantity: Option<Quantity>,
    /// Minimum limit price.
    pub min_price: Option<Money>,
    /// Maximum limit price.
    pub max_price: Option<Money>,
    /// Sort key.
    pub sort_by: SortBy,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// Page size (0 means no limit).
    pub limit: usize,
    /// Page offset.
    pub offset: usize,
}

impl OrderQuery {
    fn matches(&self, order: &Order) -> bool {
        if let Some(symbol) = &self.symbol {
            if order.symbol() != symbol {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if order.order_type().kind() != kind {
                return false;
            }
        }
        if let Some(side) = self.side {
            if order.side() != side {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status() != status {
                return false;
            }
        }
        if let Some(strategy_id) = &self.strategy_id {
            if order.strategy_id() != Some(strategy_id) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !order.tags().contains(tag) {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if order.created_at() < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if order.created_at() > to {
                return false;
            }
        }
        if let Some(min) = self.min_quantity {
            if order.quantity() < min {
                return false;
            }
        }
        if let Some(max) = self.max_quantity {
            if order.quantity() > max {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if order.order_type().limit_price().is_none_or(|p| p < min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if order.order_type().limit_price().is_none_or(|p| p > max) {
                return false;
            }
        }
        true
    }
}

/// Listing result: one page of orders plus the unpaged match count.
#[derive(Debug, Clone)]
pub struct OrderPage {
    /// Matching orders for the requested page.
    pub orders: Vec<Order>,
    /// Total number of matches before pagination.
    pub total: usize,
}

/// In-memory order table with per-order exclusive sections.
#[derive(Debug, Default)]
pub struct OrderStore {
    next_order_id: AtomicI64,
    next_fill_id: AtomicI64,
    orders: RwLock<HashMap<i64, Arc<Mutex<Order>>>>,
    uuid_index: RwLock<HashMap<Uuid, i64>>,
}

impl OrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new order from a command and insert it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderSpec` if the command fails validation; no id
    /// is consumed and nothing is stored in that case.
    pub fn create(&self, cmd: CreateOrderCommand) -> Result<Order, OrderError> {
        cmd.validate()?;

        let id = OrderId::new(self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1);
        let order = Order::new(id, cmd)?;
        self.insert(order.clone());
        Ok(order)
    }

    /// Allocate the next fill id.
    pub fn allocate_fill_id(&self) -> FillId {
        FillId::new(self.next_fill_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn insert(&self, order: Order) {
        let id = order.id().value();
        let uuid = order.uuid();

        if let Ok(mut orders) = self.orders.write() {
            orders.insert(id, Arc::new(Mutex::new(order)));
        }
        if let Ok(mut index) = self.uuid_index.write() {
            index.insert(uuid, id);
        }
    }

    fn handle(&self, id: OrderId) -> Option<Arc<Mutex<Order>>> {
        self.orders
            .read()
            .ok()
            .and_then(|orders| orders.get(&id.value()).cloned())
    }

    /// Acquire the exclusive section for an order.
    ///
    /// The returned guard serializes all transitions for that order; hold
    /// it for the duration of the mutation, including any venue call that
    /// decides the transition.
    pub async fn lock(&self, id: OrderId) -> Option<OwnedMutexGuard<Order>> {
        let handle = self.handle(id)?;
        Some(handle.lock_owned().await)
    }

    /// Snapshot an order by id.
    pub async fn get(&self, id: OrderId) -> Option<Order> {
        let handle = self.handle(id)?;
        let guard = handle.lock().await;
        Some(guard.clone())
    }

    /// Snapshot an order by its external-safe reference.
    pub async fn get_by_uuid(&self, uuid: Uuid) -> Option<Order> {
        let id = self
            .uuid_index
            .read()
            .ok()
            .and_then(|index| index.get(&uuid).copied())?;
        self.get(OrderId::new(id)).await
    }

    /// Snapshot every order, unordered.
    pub async fn snapshot_all(&self) -> Vec<Order> {
        let handles: Vec<Arc<Mutex<Order>>> = match self.orders.read() {
            Ok(orders) => orders.values().cloned().collect(),
            Err(_) => return Vec::new(),
        };

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            snapshots.push(handle.lock().await.clone());
        }
        snapshots
    }

    /// Ids of all active orders.
    pub async fn active_order_ids(&self) -> Vec<OrderId> {
        self.snapshot_all()
            .await
            .into_iter()
            .filter(Order::is_active)
            .map(|o| o.id())
            .collect()
    }

    /// Recently created active orders, for the duplicate heuristic.
    ///
    /// `exclude` skips the order being validated so it cannot match itself.
    pub async fn recent_orders(
        &self,
        window_secs: i64,
        exclude: Option<OrderId>,
    ) -> Vec<RecentOrder> {
        let now = Timestamp::now();
        self.snapshot_all()
            .await
            .into_iter()
            .filter(|o| {
                o.is_active()
                    && Some(o.id()) != exclude
                    && now.seconds_since(o.created_at()) <= window_secs
            })
            .map(|o| RecentOrder {
                symbol: o.symbol().clone(),
                side: o.side(),
                quantity: o.quantity(),
                price: o.order_type().limit_price(),
                created_at: o.created_at(),
            })
            .collect()
    }

    /// List orders with filters, sorting, and pagination.
    pub async fn list(&self, query: &OrderQuery) -> OrderPage {
        let mut matches: Vec<Order> = self
            .snapshot_all()
            .await
            .into_iter()
            .filter(|o| query.matches(o))
            .collect();

        matches.sort_by(|a, b| {
            let ordering = match query.sort_by {
                SortBy::CreatedAt => a.created_at().cmp(&b.created_at()),
                SortBy::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
                SortBy::Quantity => a.quantity().cmp(&b.quantity()),
                SortBy::Price => a
                    .order_type()
                    .limit_price()
                    .cmp(&b.order_type().limit_price()),
            };
            // Ties break on id so pagination is stable.
            let ordering = ordering.then(a.id().cmp(&b.id()));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matches.len();
        let page: Vec<Order> = matches
            .into_iter()
            .skip(query.offset)
            .take(if query.limit == 0 {
                usize::MAX
            } else {
                query.limit
            })
            .collect();

        OrderPage {
            orders: page,
            total,
        }
    }

    /// Fills for an order, ordered by fill time ascending.
    pub async fn fills(&self, id: OrderId) -> Option<Vec<Fill>> {
        let order = self.get(id).await?;
        let mut fills = order.fill_state().fills().to_vec();
        fills.sort_by_key(|f| f.fill_time);
        Some(fills)
    }

    /// Total number of stored orders.
    #[must_use]
    pub fn count(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orders::value_objects::OrderType;

    fn limit_cmd(symbol: &str, quantity: i64, price: f64) -> CreateOrderCommand {
        CreateOrderCommand::new(
            Symbol::new(symbol),
            OrderSide::Buy,
            OrderType::Limit {
                price: Money::from_f64(price),
            },
            Quantity::from_i64(quantity),
        )
    }

    #[tokio::test]
    async fn create_allocates_monotonic_ids() {
        let store = OrderStore::new();

        let a = store.create(limit_cmd("NASDAQ:AAPL", 10, 100.0)).unwrap();
        let b = store.create(limit_cmd("NASDAQ:MSFT", 10, 300.0)).unwrap();

        assert!(a.id() < b.id());
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn invalid_command_stores_nothing() {
        let store = OrderStore::new();
        let result = store.create(limit_cmd("NASDAQ:AAPL", 0, 100.0));

        assert!(result.is_err());
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn get_by_uuid_finds_order() {
        let store = OrderStore::new();
        let order = store.create(limit_cmd("NASDAQ:AAPL", 10, 100.0)).unwrap();

        let found = store.get_by_uuid(order.uuid()).await.unwrap();
        assert_eq!(found.id(), order.id());
    }

    #[tokio::test]
    async fn lock_serializes_mutations() {
        let store = OrderStore::new();
        let order = store.create(limit_cmd("NASDAQ:AAPL", 10, 100.0)).unwrap();

        {
            let mut guard = store.lock(order.id()).await.unwrap();
            guard.set_risk_result(true, "ok");
        }

        let snapshot = store.get(order.id()).await.unwrap();
        assert!(snapshot.risk_check_passed());
    }

    #[tokio::test]
    async fn list_filters_by_symbol_and_status() {
        let store = OrderStore::new();
        store.create(limit_cmd("NASDAQ:AAPL", 10, 100.0)).unwrap();
        store.create(limit_cmd("NASDAQ:MSFT", 20, 300.0)).unwrap();

        let query = OrderQuery {
            symbol: Some(Symbol::new("NASDAQ:AAPL")),
            status: Some(OrderStatus::Pending),
            ..OrderQuery::default()
        };
        let page = store.list(&query).await;

        assert_eq!(page.total, 1);
        assert_eq!(page.orders[0].symbol().as_str(), "NASDAQ:AAPL");
    }

    #[tokio::test]
    async fn list_paginates_with_stable_order() {
        let store = OrderStore::new();
        for i in 0..5 {
            store
                .create(limit_cmd("NASDAQ:AAPL", 10 + i, 100.0))
                .unwrap();
        }

        let query = OrderQuery {
            sort_by: SortBy::Quantity,
            sort_order: SortOrder::Asc,
            limit: 2,
            offset: 2,
            ..OrderQuery::default()
        };
        let page = store.list(&query).await;

        assert_eq!(page.total, 5);
        assert_eq!(page.orders.len(), 2);
        assert_eq!(page.orders[0].quantity(), Quantity::from_i64(12));
        assert_eq!(page.orders[1].quantity(), Quantity::from_i64(13));
    }

    #[tokio::test]
    async fn list_filters_by_price_range() {
        let store = OrderStore::new();
        store.create(limit_cmd("NASDAQ:AAPL", 10, 50.0)).unwrap();
        store.create(limit_cmd("NASDAQ:AAPL", 10, 150.0)).unwrap();

        let query = OrderQuery {
            min_price: Some(Money::from_f64(100.0)),
            ..OrderQuery::default()
        };
        let page = store.list(&query).await;

        assert_eq!(page.total, 1);
        assert_eq!(
            page.orders[0].order_type().limit_price(),
            Some(Money::from_f64(150.0))
        );
    }

    #[tokio::test]
    async fn recent_orders_reflect_window_and_exclusion() {
        let store = OrderStore::new();
        let order = store.create(limit_cmd("NASDAQ:AAPL", 10, 100.0)).unwrap();

        let recent = store.recent_orders(60, None).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].quantity, Quantity::from_i64(10));

        let excluding_self = store.recent_orders(60, Some(order.id())).await;
        assert!(excluding_self.is_empty());
    }

    #[tokio::test]
    async fn fills_sorted_by_fill_time() {
        let store = OrderStore::new();
        let order = store.create(limit_cmd("NASDAQ:AAPL", 10, 100.0)).unwrap();

        let fills = store.fills(order.id()).await.unwrap();
        assert!(fills.is_empty());
    }
}
