//! Execution service orchestrator.
//!
//! Process-wide coordinator: owns the service lifecycle, the aggregate
//! counters, the background reconciliation loop, and the execution-report
//! queue that push-style venues feed. Constructed explicitly and passed
//! around as a handle; there is no global instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::ports::ExecutionReport;
use crate::domain::orders::aggregate::{CreateOrderCommand, Order, OrderPatch};
use crate::domain::orders::errors::OrderError;
use crate::domain::orders::value_objects::{Fill, OrderStatus};
use crate::domain::risk::RiskCheckResult;
use crate::domain::shared::OrderId;
use crate::execution::recorder::{FillRecorder, RecorderError};
use crate::execution::router::{
    ExecutionRouter, RouterError, SubmitOutcome, VenueHealth, VenueRegistry,
};
use crate::execution::store::{OrderPage, OrderQuery, OrderStore};

/// Service lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceState {
    /// Constructed but never started.
    Uninitialized,
    /// Accepting submissions, background loops running.
    Running,
    /// Background loops halted; orders remain queryable.
    Stopped,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "UNINITIALIZED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Aggregate counters, reset only when the process restarts.
#[derive(Debug, Default)]
struct ServiceCounters {
    total_submitted: AtomicU64,
    total_executed: AtomicU64,
    total_cancelled: AtomicU64,
    total_rejected: AtomicU64,
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CounterSnapshot {
    /// Orders that reached a venue.
    pub total_submitted: u64,
    /// Orders completely filled.
    pub total_executed: u64,
    /// Orders cancelled.
    pub total_cancelled: u64,
    /// Orders rejected.
    pub total_rejected: u64,
}

impl ServiceCounters {
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_submitted: self.total_submitted.load(Ordering::Relaxed),
            total_executed: self.total_executed.load(Ordering::Relaxed),
            total_cancelled: self.total_cancelled.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Observability snapshot returned by `status()`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Lifecycle state.
    pub state: ServiceState,
    /// Health of every registered venue connector.
    pub venues: Vec<VenueHealth>,
    /// Aggregate counters.
    pub counters: CounterSnapshot,
    /// Number of currently active orders.
    pub active_orders: usize,
}

/// An execution report pushed by a venue, addressed to an order.
#[derive(Debug, Clone)]
pub struct VenueExecutionEvent {
    /// Target order.
    pub order_id: OrderId,
    /// The venue's execution report.
    pub report: ExecutionReport,
}

/// Result of placing an order through the service.
#[derive(Debug, Clone)]
pub struct PlaceOrderResponse {
    /// The created order in its post-routing state.
    pub order: Order,
    /// The risk result when the gate failed; `None` on a pass.
    pub risk: Option<RiskCheckResult>,
    /// Routing failure surfaced as degraded status rather than a crash;
    /// the order stays in its last-known-good state.
    pub routing_error: Option<String>,
}

/// Errors from service-level operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service is not accepting new submissions.
    #[error("Execution service is not running")]
    NotRunning,

    /// Routing failure.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// Order-level failure.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Ingestion failure.
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// Tunables for the service loops.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Whether the background reconciliation loop runs.
    pub reconcile_enabled: bool,
    /// Reconciliation poll interval.
    pub reconcile_interval: Duration,
    /// Capacity of the execution-report queue.
    pub report_queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            reconcile_enabled: true,
            reconcile_interval: Duration::from_secs(5),
            report_queue_capacity: 1024,
        }
    }
}

/// Process-wide execution coordinator.
pub struct ExecutionService {
    store: Arc<OrderStore>,
    router: Arc<ExecutionRouter>,
    recorder: Arc<FillRecorder>,
    venues: Arc<VenueRegistry>,
    config: ServiceConfig,
    state: std::sync::RwLock<ServiceState>,
    counters: ServiceCounters,
    report_tx: std::sync::RwLock<Option<mpsc::Sender<VenueExecutionEvent>>>,
    shutdown_tx: std::sync::RwLock<Option<watch::Sender<bool>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ExecutionService {
    /// Wire the service over its collaborators. The service starts
    /// `Uninitialized`; call [`ExecutionService::start`].
    #[must_use]
    pub fn new(
        store: Arc<OrderStore>,
        router: Arc<ExecutionRouter>,
        recorder: Arc<FillRecorder>,
        venues: Arc<VenueRegistry>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            router,
            recorder,
            venues,
            config,
            state: std::sync::RwLock::new(ServiceState::Uninitialized),
            counters: ServiceCounters::default(),
            report_tx: std::sync::RwLock::new(None),
            shutdown_tx: std::sync::RwLock::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(ServiceState::Stopped)
    }

    fn set_state(&self, state: ServiceState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = state;
        }
    }

    /// Start accepting submissions and spawn the background loops.
    ///
    /// Idempotent: starting a running service is a no-op.
    pub async fn start(self: &Arc<Self>) {
        if self.state() == ServiceState::Running {
            tracing::debug!("Execution service already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (report_tx, report_rx) = mpsc::channel(self.config.report_queue_capacity);

        if let Ok(mut guard) = self.shutdown_tx.write() {
            *guard = Some(shutdown_tx);
        }
        if let Ok(mut guard) = self.report_tx.write() {
            *guard = Some(report_tx);
        }

        let consumer_task = tokio::spawn(Self::report_consumer_loop(
            Arc::clone(self),
            report_rx,
            shutdown_rx.clone(),
        ));

        {
            let mut tasks = self.tasks.lock().await;
            if self.config.reconcile_enabled {
                tasks.push(tokio::spawn(Self::reconcile_loop(
                    Arc::clone(self),
                    shutdown_rx,
                )));
            }
            tasks.push(consumer_task);
        }

        self.set_state(ServiceState::Running);
        tracing::info!(
            reconcile_interval_secs = self.config.reconcile_interval.as_secs(),
            "Execution service started"
        );
    }

    /// Halt new submissions and background loops.
    ///
    /// In-flight orders are not cancelled and remain queryable.
    pub async fn stop(&self) {
        if self.state() != ServiceState::Running {
            return;
        }

        if let Ok(guard) = self.shutdown_tx.read() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(true);
            }
        }
        if let Ok(mut guard) = self.report_tx.write() {
            *guard = None;
        }

        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }

        self.set_state(ServiceState::Stopped);
        tracing::info!("Execution service stopped");
    }

    /// Sender for push-style venue execution reports.
    ///
    /// Returns `None` while the service is not running.
    #[must_use]
    pub fn report_sender(&self) -> Option<mpsc::Sender<VenueExecutionEvent>> {
        self.report_tx.read().ok().and_then(|g| g.clone())
    }

    /// Create an order and route it through the risk gate to a venue.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` when submissions are halted and
    /// `InvalidOrderSpec` when the command fails validation. Venue
    /// failures are surfaced in the response, not as errors.
    pub async fn place_order(
        &self,
        cmd: CreateOrderCommand,
    ) -> Result<PlaceOrderResponse, ServiceError> {
        if self.state() != ServiceState::Running {
            return Err(ServiceError::NotRunning);
        }

        let order = self.store.create(cmd)?;
        let order_id = order.id();
        tracing::info!(
            order_id = %order_id,
            uuid = %order.uuid(),
            symbol = %order.symbol(),
            side = %order.side(),
            "Order created"
        );

        match self.router.submit_order(order_id).await {
            Ok(SubmitOutcome::Submitted(order)) => {
                self.counters
                    .total_submitted
                    .fetch_add(1, Ordering::Relaxed);
                self.observe_terminal(&order);
                Ok(PlaceOrderResponse {
                    order,
                    risk: None,
                    routing_error: None,
                })
            }
            Ok(SubmitOutcome::RiskRejected { order, result }) => Ok(PlaceOrderResponse {
                order,
                risk: Some(result),
                routing_error: None,
            }),
            Err(e @ (RouterError::NoAvailableVenue { .. }
            | RouterError::VenueTimeout { .. }
            | RouterError::Venue(_))) => {
                // Degraded but observable: the order stays pending and the
                // reconcile loop or a retry resolves it.
                let order = self
                    .store
                    .get(order_id)
                    .await
                    .ok_or(RouterError::OrderNotFound(order_id))?;
                Ok(PlaceOrderResponse {
                    order,
                    risk: None,
                    routing_error: Some(e.to_string()),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run the risk check for an order shape without persisting anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderSpec` when the command fails validation.
    pub async fn risk_check(&self, cmd: CreateOrderCommand) -> Result<RiskCheckResult, ServiceError> {
        let draft = Order::new(OrderId::new(0), cmd)?;
        Ok(self.router.risk_check(&draft).await)
    }

    /// Apply a partial update to an active order.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotEditable`, `QuantityBelowFilled`, or
    /// `InvalidOrderSpec` per the order's rules.
    pub async fn update_order(
        &self,
        order_id: OrderId,
        patch: OrderPatch,
    ) -> Result<Order, ServiceError> {
        let mut order = self
            .store
            .lock(order_id)
            .await
            .ok_or(ServiceError::Order(OrderError::NotFound {
                order_id: order_id.to_string(),
            }))?;
        order.apply_update(patch)?;
        tracing::info!(order_id = %order_id, "Order updated");
        Ok(order.clone())
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotEditable` when the order is not active, plus venue
    /// errors when the venue refuses.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        let order = self.router.cancel_order(order_id).await?;
        self.counters
            .total_cancelled
            .fetch_add(1, Ordering::Relaxed);
        Ok(order)
    }

    /// Administratively pause an order.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error unless the order is `Accepted`
    /// or `PartiallyFilled`.
    pub async fn suspend_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        let mut order = self
            .store
            .lock(order_id)
            .await
            .ok_or(ServiceError::Order(OrderError::NotFound {
                order_id: order_id.to_string(),
            }))?;
        order.suspend()?;
        tracing::info!(order_id = %order_id, "Order suspended");
        Ok(order.clone())
    }

    /// Resume a suspended order.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error unless the order is `Suspended`.
    pub async fn resume_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        let mut order = self
            .store
            .lock(order_id)
            .await
            .ok_or(ServiceError::Order(OrderError::NotFound {
                order_id: order_id.to_string(),
            }))?;
        order.resume()?;
        tracing::info!(order_id = %order_id, "Order resumed");
        Ok(order.clone())
    }

    /// Snapshot an order by internal id.
    pub async fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.store.get(order_id).await
    }

    /// Snapshot an order by its external-safe reference.
    pub async fn get_order_by_uuid(&self, uuid: Uuid) -> Option<Order> {
        self.store.get_by_uuid(uuid).await
    }

    /// List orders with filters and pagination.
    pub async fn list_orders(&self, query: &OrderQuery) -> OrderPage {
        self.store.list(query).await
    }

    /// Fills for an order, ordered by fill time ascending.
    pub async fn list_fills(&self, order_id: OrderId) -> Option<Vec<Fill>> {
        self.store.fills(order_id).await
    }

    /// Connector health plus aggregate counters.
    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            state: self.state(),
            venues: self.venues.health(),
            counters: self.counters.snapshot(),
            active_orders: self.store.active_order_ids().await.len(),
        }
    }

    /// Run one reconcile pass on demand (also used by the background loop).
    pub async fn reconcile_once(&self) {
        let report = self.router.reconcile().await;
        self.counters
            .total_executed
            .fetch_add(report.orders_filled as u64, Ordering::Relaxed);
        self.counters
            .total_cancelled
            .fetch_add(report.orders_cancelled as u64, Ordering::Relaxed);
        self.counters
            .total_rejected
            .fetch_add(report.orders_rejected as u64, Ordering::Relaxed);
    }

    fn observe_terminal(&self, order: &Order) {
        match order.status() {
            OrderStatus::Filled => {
                self.counters.total_executed.fetch_add(1, Ordering::Relaxed);
            }
            OrderStatus::Cancelled => {
                self.counters
                    .total_cancelled
                    .fetch_add(1, Ordering::Relaxed);
            }
            OrderStatus::Rejected => {
                self.counters.total_rejected.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    async fn reconcile_loop(service: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(service.config.reconcile_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    service.reconcile_once().await;
                }
                _ = shutdown.changed() => {
                    tracing::debug!("Reconcile loop shutting down");
                    return;
                }
            }
        }
    }

    async fn report_consumer_loop(
        service: Arc<Self>,
        mut report_rx: mpsc::Receiver<VenueExecutionEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = report_rx.recv() => {
                    let Some(event) = event else {
                        tracing::debug!("Report queue closed");
                        return;
                    };
                    match service.recorder.ingest(event.order_id, &event.report).await {
                        Ok(outcome) => {
                            if !outcome.duplicate && outcome.order_status == OrderStatus::Filled {
                                service
                                    .counters
                                    .total_executed
                                    .fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                order_id = %event.order_id,
                                error = %e,
                                "Failed to ingest pushed execution report"
                            );
                        }
                    }
                }
                _ = shutdown.changed() => {
                    tracing::debug!("Report consumer shutting down");
                    return;
                }
            }
        }
    }
}
