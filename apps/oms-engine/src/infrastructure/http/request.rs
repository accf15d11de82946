//! HTTP request types.

use serde::Deserialize;

use crate::domain::orders::value_objects::{OrderKind, OrderSide, OrderStatus};
use crate::domain::shared::{Money, Quantity, StrategyId, Symbol, Timestamp};
use crate::execution::store::{OrderQuery, SortBy, SortOrder};

/// Query-string parameters for listing orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersParams {
    /// Match this symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Match this order type.
    #[serde(default)]
    pub order_type: Option<OrderKind>,
    /// Match this side.
    #[serde(default)]
    pub side: Option<OrderSide>,
    /// Match this status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Match this strategy.
    #[serde(default)]
    pub strategy_id: Option<String>,
    /// Require this tag.
    #[serde(default)]
    pub tag: Option<String>,
    /// Created at or after.
    #[serde(default)]
    pub created_from: Option<Timestamp>,
    /// Created at or before.
    #[serde(default)]
    pub created_to: Option<Timestamp>,
    /// Minimum quantity.
    #[serde(default)]
    pub min_quantity: Option<Quantity>,
    /// Maximum quantity.
    #[serde(default)]
    pub max_quantity: Option<Quantity>,
    /// Minimum limit price.
    #[serde(default)]
    pub min_price: Option<Money>,
    /// Maximum limit price.
    #[serde(default)]
    pub max_price: Option<Money>,
    /// Sort key.
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    /// Sort direction.
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    /// Page size; defaults to 100.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Page offset.
    #[serde(default)]
    pub offset: Option<usize>,
}

impl ListOrdersParams {
    /// Default page size when none is requested.
    pub const DEFAULT_LIMIT: usize = 100;

    /// Convert into a store query.
    #[must_use]
    pub fn into_query(self) -> OrderQuery {
        OrderQuery {
            symbol: self.symbol.map(Symbol::new),
            kind: self.order_type,
            side: self.side,
            status: self.status,
            strategy_id: self.strategy_id.map(StrategyId::new),
            tag: self.tag,
            created_from: self.created_from,
            created_to: self.created_to,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            min_price: self.min_price,
            max_price: self.max_price,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
            limit: self.limit.unwrap_or(Self::DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(0),
        }
    }
}
