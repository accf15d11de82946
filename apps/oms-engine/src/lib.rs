// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! OMS Engine - Rust Core Library
//!
//! Order lifecycle management with execution routing and pre-trade risk
//! validation. Accepts client orders, validates them, routes them to
//! external trading venues, and tracks their lifecycle and fills.
//!
//! # Architecture
//!
//! - **Domain**: core business logic with no infrastructure dependencies
//!   - `orders`: the Order aggregate, fills, and the status state machine
//!   - `risk`: pure pre-trade validation over a read-only account snapshot
//! - **Application**: ports and DTOs
//!   - `ports`: `VenueConnector` and `AccountDataPort` abstractions
//!   - `dto`: flat wire shapes converted into tagged domain types
//! - **Execution**: the engine itself
//!   - `store`: the shared order table with per-order exclusive sections
//!   - `router`: risk gate, venue selection, reconciliation
//!   - `recorder`: idempotent execution-report ingestion
//!   - `service`: lifecycle, counters, and background loops
//! - **Infrastructure**: adapters
//!   - `venues`: deterministic mock venue connector
//!   - `http`: axum JSON API

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Application layer - ports and DTOs.
pub mod application;

/// Configuration loading and validation.
pub mod config;

/// Domain layer - core business logic.
pub mod domain;

/// Execution layer - order table, routing, ingestion, orchestration.
pub mod execution;

/// Infrastructure layer - adapters and external integrations.
pub mod infrastructure;

/// Logging initialization.
pub mod observability;

// Domain re-exports
pub use domain::orders::aggregate::{CreateOrderCommand, Order, OrderPatch};
pub use domain::orders::value_objects::{
    Fill, LiquidityType, OrderKind, OrderPriority, OrderSide, OrderSource, OrderStatus, OrderType,
    TimeInForce, TrailOffset,
};
pub use domain::risk::{AccountContext, RiskCheckResult, RiskCode, RiskLimits, RiskValidator};
pub use domain::shared::{
    AccountId, BacktestId, FillId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp,
    VenueOrderId,
};

// Application re-exports
pub use application::dto::{CreateOrderRequest, OrderView, UpdateOrderRequest};
pub use application::ports::{
    AccountDataPort, ExecutionReport, StaticAccountData, VenueConnector, VenueError,
    VenueOrderSnapshot, VenueOrderStatus, VenueSubmitRequest,
};

// Execution re-exports
pub use execution::recorder::FillRecorder;
pub use execution::router::{ExecutionRouter, SubmitOutcome, VenueRegistry};
pub use execution::service::{
    ExecutionService, ServiceConfig, ServiceState, ServiceStatus, VenueExecutionEvent,
};
pub use execution::store::{OrderQuery, OrderStore};

// Infrastructure re-exports
pub use infrastructure::http::{create_router, AppState};
pub use infrastructure::venues::{MockFillMode, MockVenueConnector};
