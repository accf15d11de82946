//! Execution router.
//!
//! Gates orders through the risk validator, assigns them to a venue
//! connector, and absorbs venue-reported state back into the order table.
//! The router only ever mutates orders through aggregate methods while
//! holding the order's exclusive section.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;

use crate::application::ports::{
    AccountDataPort, VenueConnector, VenueError, VenueOrderSnapshot, VenueOrderStatus,
    VenueSubmitRequest,
};
use crate::domain::orders::aggregate::Order;
use crate::domain::orders::errors::OrderError;
use crate::domain::orders::value_objects::OrderStatus;
use crate::domain::risk::{RiskCheckResult, RiskValidator};
use crate::domain::shared::{AccountId, OrderId, Symbol};
use crate::execution::recorder::{FillRecorder, RecorderError};
use crate::execution::store::OrderStore;

/// Health view of one registered connector.
#[derive(Debug, Clone, Serialize)]
pub struct VenueHealth {
    /// Venue name.
    pub venue: String,
    /// Account the connector trades under.
    pub account_id: AccountId,
    /// Whether the connector has a live session.
    pub connected: bool,
}

/// Registry of venue connectors with symbol-to-venue routing.
#[derive(Default)]
pub struct VenueRegistry {
    connectors: HashMap<String, Arc<dyn VenueConnector>>,
    symbol_routes: HashMap<Symbol, String>,
    default_venue: Option<String>,
}

impl VenueRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its venue name.
    pub fn register(&mut self, connector: Arc<dyn VenueConnector>) {
        self.connectors
            .insert(connector.venue_name().to_string(), connector);
    }

    /// Route a symbol to a specific venue.
    pub fn add_route(&mut self, symbol: Symbol, venue: impl Into<String>) {
        self.symbol_routes.insert(symbol, venue.into());
    }

    /// Set the fallback venue for unrouted symbols.
    pub fn set_default_venue(&mut self, venue: impl Into<String>) {
        self.default_venue = Some(venue.into());
    }

    /// Look up a connector by venue name.
    #[must_use]
    pub fn connector(&self, venue: &str) -> Option<Arc<dyn VenueConnector>> {
        self.connectors.get(venue).cloned()
    }

    /// Resolve the connector for a symbol, skipping disconnected venues.
    ///
    /// The symbol-specific route wins; the default venue is the fallback.
    #[must_use]
    pub fn route(&self, symbol: &Symbol) -> Option<Arc<dyn VenueConnector>> {
        let candidates = self
            .symbol_routes
            .get(symbol)
            .into_iter()
            .chain(self.default_venue.as_ref());

        for venue in candidates {
            if let Some(connector) = self.connectors.get(venue) {
                if connector.is_connected() {
                    return Some(Arc::clone(connector));
                }
                tracing::warn!(venue = %venue, symbol = %symbol, "Connector disconnected, skipping");
            }
        }
        None
    }

    /// Health of every registered connector.
    #[must_use]
    pub fn health(&self) -> Vec<VenueHealth> {
        let mut health: Vec<VenueHealth> = self
            .connectors
            .values()
            .map(|c| VenueHealth {
                venue: c.venue_name().to_string(),
                account_id: c.account_id().clone(),
                connected: c.is_connected(),
            })
            .collect();
        health.sort_by(|a, b| a.venue.cmp(&b.venue));
        health
    }
}

/// Errors from routing operations.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// No connected venue can take the order.
    #[error("No available venue for symbol {symbol}")]
    NoAvailableVenue {
        /// Symbol that could not be routed.
        symbol: Symbol,
    },

    /// A venue call exceeded its bounded timeout.
    ///
    /// The order remains in its last-known-good state; the reconcile loop
    /// resolves the ambiguity once connectivity returns.
    #[error("Venue '{venue}' timed out after {secs}s")]
    VenueTimeout {
        /// Venue name.
        venue: String,
        /// Timeout that elapsed.
        secs: u64,
    },

    /// Venue call failed.
    #[error(transparent)]
    Venue(#[from] VenueError),

    /// Order-level failure.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
}

/// Outcome of a submission attempt.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Risk passed and the venue holds the order.
    Submitted(Order),
    /// The risk gate failed; the order stays `Pending` untransitioned.
    RiskRejected {
        /// Snapshot of the gated order.
        order: Order,
        /// The failing risk result.
        result: RiskCheckResult,
    },
}

/// Summary of one reconcile pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Active orders inspected.
    pub orders_checked: usize,
    /// New fills ingested from venue snapshots.
    pub fills_recorded: usize,
    /// Orders that advanced to `Accepted`.
    pub orders_accepted: usize,
    /// Orders that reached `Filled`.
    pub orders_filled: usize,
    /// Orders cancelled from venue state (including IOC leftovers).
    pub orders_cancelled: usize,
    /// Orders rejected from venue state (including FOK misses).
    pub orders_rejected: usize,
    /// GTD orders expired by the scheduled check.
    pub orders_expired: usize,
    /// Non-fatal problems encountered, as log-ready strings.
    pub errors: Vec<String>,
}

/// Routes orders to venues and reconciles venue state.
pub struct ExecutionRouter {
    store: Arc<OrderStore>,
    recorder: Arc<FillRecorder>,
    validator: RiskValidator,
    accounts: Arc<dyn AccountDataPort>,
    venues: Arc<VenueRegistry>,
    venue_timeout: Duration,
    duplicate_window_secs: i64,
}

impl ExecutionRouter {
    /// Wire a router over the shared order table.
    #[must_use]
    pub fn new(
        store: Arc<OrderStore>,
        recorder: Arc<FillRecorder>,
        validator: RiskValidator,
        accounts: Arc<dyn AccountDataPort>,
        venues: Arc<VenueRegistry>,
        venue_timeout: Duration,
        duplicate_window_secs: i64,
    ) -> Self {
        Self {
            store,
            recorder,
            validator,
            accounts,
            venues,
            venue_timeout,
            duplicate_window_secs,
        }
    }

    /// Run the risk validator for an order draft without persisting
    /// anything.
    pub async fn risk_check(&self, order: &Order) -> RiskCheckResult {
        let mut ctx = self.accounts.account_context().await;
        ctx.recent_orders = self
            .store
            .recent_orders(self.duplicate_window_secs, Some(order.id()))
            .await;
        self.validator.check(order, &ctx)
    }

    /// Risk-gate and route a pending order to a venue.
    ///
    /// On a risk failure the result is returned to the caller and the
    /// order does not transition. On venue timeout the order stays
    /// `Pending` and the reconcile loop is the recovery path.
    ///
    /// # Errors
    ///
    /// Returns `NoAvailableVenue` when no connected connector takes the
    /// symbol, `VenueTimeout`/`Venue` for venue failures, and order-state
    /// errors when the order is not routable.
    pub async fn submit_order(&self, order_id: OrderId) -> Result<SubmitOutcome, RouterError> {
        // Assemble the account view before taking the order's exclusive
        // section; the recent-order sweep visits every order in the table.
        let mut ctx = self.accounts.account_context().await;
        ctx.recent_orders = self
            .store
            .recent_orders(self.duplicate_window_secs, Some(order_id))
            .await;

        let mut order = self
            .store
            .lock(order_id)
            .await
            .ok_or(RouterError::OrderNotFound(order_id))?;

        if order.status() != OrderStatus::Pending {
            return Err(RouterError::Order(OrderError::InvalidStateTransition {
                from: order.status(),
                to: OrderStatus::Submitted,
                reason: "Only pending orders can be routed".to_string(),
            }));
        }

        let result = self.validator.check(&order, &ctx);
        order.set_risk_result(result.passed, result.summary());

        if !result.passed {
            tracing::warn!(
                order_id = %order_id,
                errors = result.errors.len(),
                "Risk gate failed, order stays pending"
            );
            return Ok(SubmitOutcome::RiskRejected {
                order: order.clone(),
                result,
            });
        }

        let connector =
            self.venues
                .route(order.symbol())
                .ok_or_else(|| RouterError::NoAvailableVenue {
                    symbol: order.symbol().clone(),
                })?;

        let request = VenueSubmitRequest {
            order_id,
            symbol: order.symbol().clone(),
            side: order.side(),
            order_type: *order.order_type(),
            quantity: order.quantity(),
            time_in_force: order.time_in_force(),
            expire_time: order.expire_time(),
            priority: order.priority(),
        };

        tracing::info!(
            order_id = %order_id,
            venue = %connector.venue_name(),
            symbol = %request.symbol,
            side = %request.side,
            quantity = %request.quantity,
            "Submitting order to venue"
        );

        let venue_order_id = match timeout(self.venue_timeout, connector.submit(&request)).await {
            Ok(Ok(venue_order_id)) => venue_order_id,
            Ok(Err(e)) => {
                tracing::warn!(order_id = %order_id, error = %e, "Venue submit failed");
                return Err(RouterError::Venue(e));
            }
            Err(_) => {
                tracing::warn!(
                    order_id = %order_id,
                    venue = %connector.venue_name(),
                    "Venue submit timed out, order stays pending until reconciled"
                );
                return Err(RouterError::VenueTimeout {
                    venue: connector.venue_name().to_string(),
                    secs: self.venue_timeout.as_secs(),
                });
            }
        };

        order.mark_submitted(venue_order_id)?;

        // Immediate-or-cancel styles resolve on the spot rather than rest.
        if order.time_in_force().is_immediate() {
            let mut report = ReconcileReport::default();
            self.sync_locked(&mut order, &connector, &mut report).await;
        }

        Ok(SubmitOutcome::Submitted(order.clone()))
    }

    /// Cancel an order, at the venue when it has been routed.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotEditable` when the order is not active, and venue
    /// errors when the venue refuses the cancel.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, RouterError> {
        let mut order = self
            .store
            .lock(order_id)
            .await
            .ok_or(RouterError::OrderNotFound(order_id))?;

        if !order.is_active() {
            return Err(RouterError::Order(OrderError::OrderNotEditable {
                status: order.status(),
            }));
        }

        // Not yet at a venue: cancel locally.
        let Some(venue_order_id) = order.venue_order_id().cloned() else {
            order.cancel()?;
            tracing::info!(order_id = %order_id, "Pending order cancelled locally");
            return Ok(order.clone());
        };

        let connector =
            self.venues
                .route(order.symbol())
                .ok_or_else(|| RouterError::NoAvailableVenue {
                    symbol: order.symbol().clone(),
                })?;

        match timeout(self.venue_timeout, connector.cancel(&venue_order_id)).await {
            Ok(Ok(())) => {
                order.cancel()?;
                tracing::info!(
                    order_id = %order_id,
                    venue = %connector.venue_name(),
                    "Order cancelled on venue ack"
                );
                Ok(order.clone())
            }
            Ok(Err(e)) => {
                tracing::warn!(order_id = %order_id, error = %e, "Venue cancel failed");
                Err(RouterError::Venue(e))
            }
            Err(_) => Err(RouterError::VenueTimeout {
                venue: connector.venue_name().to_string(),
                secs: self.venue_timeout.as_secs(),
            }),
        }
    }

    /// Poll venue state for every active order and absorb discrepancies.
    ///
    /// This is how external fills become internal fills when a venue does
    /// not push events, and how due GTD orders expire.
    pub async fn reconcile(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let active = self.store.active_order_ids().await;

        for order_id in active {
            let Some(mut order) = self.store.lock(order_id).await else {
                continue;
            };
            report.orders_checked += 1;

            if order.is_expiry_due() {
                self.expire_locked(&mut order, &mut report).await;
                continue;
            }

            if order.venue_order_id().is_none() || !order.status().is_working() {
                continue;
            }

            let Some(connector) = self.venues.route(order.symbol()) else {
                report
                    .errors
                    .push(format!("order {order_id}: no available venue to poll"));
                continue;
            };

            self.sync_locked(&mut order, &connector, &mut report).await;
        }

        if report.fills_recorded > 0 || !report.errors.is_empty() {
            tracing::info!(
                orders_checked = report.orders_checked,
                fills_recorded = report.fills_recorded,
                errors = report.errors.len(),
                "Reconcile pass complete"
            );
        }

        report
    }

    /// Expire a due GTD order, cancelling at the venue best-effort.
    async fn expire_locked(&self, order: &mut Order, report: &mut ReconcileReport) {
        if let Some(venue_order_id) = order.venue_order_id().cloned() {
            if let Some(connector) = self.venues.route(order.symbol()) {
                if let Ok(Err(e)) =
                    timeout(self.venue_timeout, connector.cancel(&venue_order_id)).await
                {
                    tracing::warn!(order_id = %order.id(), error = %e, "Venue cancel on expiry failed");
                }
            }
        }
        match order.expire() {
            Ok(()) => {
                report.orders_expired += 1;
                tracing::info!(order_id = %order.id(), "GTD order expired");
            }
            Err(e) => report.errors.push(format!("order {}: {e}", order.id())),
        }
    }

    /// Query the venue for one locked order and apply the snapshot.
    async fn sync_locked(
        &self,
        order: &mut Order,
        connector: &Arc<dyn VenueConnector>,
        report: &mut ReconcileReport,
    ) {
        let Some(venue_order_id) = order.venue_order_id().cloned() else {
            return;
        };

        let snapshot = match timeout(
            self.venue_timeout,
            connector.query_status(&venue_order_id),
        )
        .await
        {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                report
                    .errors
                    .push(format!("order {}: query_status failed: {e}", order.id()));
                return;
            }
            Err(_) => {
                report
                    .errors
                    .push(format!("order {}: query_status timed out", order.id()));
                return;
            }
        };

        self.apply_snapshot(order, &snapshot, report);
    }

    /// Fold a venue snapshot into the order: new fills first, then status.
    fn apply_snapshot(
        &self,
        order: &mut Order,
        snapshot: &VenueOrderSnapshot,
        report: &mut ReconcileReport,
    ) {
        // Venue acknowledgment comes before any fill can apply.
        if order.status() == OrderStatus::Submitted
            && !matches!(snapshot.status, VenueOrderStatus::Rejected)
        {
            match order.mark_accepted() {
                Ok(()) => report.orders_accepted += 1,
                Err(e) => {
                    report.errors.push(format!("order {}: {e}", order.id()));
                    return;
                }
            }
        }

        for venue_fill in &snapshot.fills {
            if order.fill_state().has_external_fill(&venue_fill.external_fill_id) {
                continue;
            }
            match self.recorder.ingest_into(order, venue_fill) {
                Ok(outcome) => {
                    report.fills_recorded += 1;
                    if outcome.order_status == OrderStatus::Filled {
                        report.orders_filled += 1;
                    }
                }
                Err(RecorderError::IntegrityViolation { order_id, details }) => {
                    // Fatal for this order; surface loudly and stop folding.
                    report
                        .errors
                        .push(format!("order {order_id}: integrity violation: {details}"));
                    return;
                }
                Err(e) => {
                    report.errors.push(format!("order {}: {e}", order.id()));
                }
            }
        }

        match snapshot.status {
            VenueOrderStatus::Accepted
            | VenueOrderStatus::PartiallyFilled
            | VenueOrderStatus::Filled => {}
            VenueOrderStatus::Cancelled => {
                // IOC leftovers and venue-side cancels land here.
                if order.status().is_active() {
                    match order.cancel() {
                        Ok(()) => {
                            report.orders_cancelled += 1;
                            tracing::info!(
                                order_id = %order.id(),
                                tif = %order.time_in_force(),
                                "Order cancelled from venue state"
                            );
                        }
                        Err(e) => report.errors.push(format!("order {}: {e}", order.id())),
                    }
                }
            }
            VenueOrderStatus::Rejected => {
                if !order.status().is_terminal() {
                    let reason = snapshot
                        .reject_reason
                        .clone()
                        .unwrap_or_else(|| "rejected by venue".to_string());
                    match order.reject(reason) {
                        Ok(()) => {
                            report.orders_rejected += 1;
                            tracing::warn!(
                                order_id = %order.id(),
                                tif = %order.time_in_force(),
                                "Order rejected from venue state"
                            );
                        }
                        Err(e) => report.errors.push(format!("order {}: {e}", order.id())),
                    }
                }
            }
            VenueOrderStatus::Expired => {
                if !order.status().is_terminal() {
                    match order.expire() {
                        Ok(()) => report.orders_expired += 1,
                        Err(e) => report.errors.push(format!("order {}: {e}", order.id())),
                    }
                }
            }
        }

        // A venue that reports Filled while our fills disagree is a
        // discrepancy worth surfacing, not silently correcting.
        if snapshot.status == VenueOrderStatus::Filled
            && order.status() != OrderStatus::Filled
        {
            report.errors.push(format!(
                "order {}: venue reports FILLED but local fills cover {} of {}",
                order.id(),
                order.filled_quantity(),
                order.quantity()
            ));
        }
    }
}
