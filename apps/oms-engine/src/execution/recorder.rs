//! Fill recorder.
//!
//! The only ingestion path for execution reports, whether they arrive from
//! the reconcile poll or a push-style venue feed. Idempotent on the
//! venue-assigned fill id.

use std::sync::Arc;

use crate::application::ports::ExecutionReport;
use crate::domain::orders::aggregate::Order;
use crate::domain::orders::errors::OrderError;
use crate::domain::orders::value_objects::{Fill, OrderStatus};
use crate::domain::shared::{OrderId, Timestamp};
use crate::execution::store::OrderStore;

/// Errors from execution-report ingestion.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// The report failed validation; caller-fixable, no retry.
    #[error("Invalid execution report, field '{field}': {message}")]
    InvalidExecutionReport {
        /// Offending field.
        field: String,
        /// Error message.
        message: String,
    },

    /// Target order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order rejected the fill (wrong state or overfill).
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Filled quantity diverged from the sum of recorded fills.
    ///
    /// This invariant is fatal; it indicates corrupted state rather than
    /// a caller mistake.
    #[error("Fill integrity violated for order {order_id}: {details}")]
    IntegrityViolation {
        /// Order id.
        order_id: OrderId,
        /// State description.
        details: String,
    },
}

/// Outcome of ingesting one execution report.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The recorded fill (the pre-existing one on duplicates).
    pub fill: Fill,
    /// Order status after ingestion.
    pub order_status: OrderStatus,
    /// True when the report was a duplicate and nothing changed.
    pub duplicate: bool,
}

/// Ingests execution reports into immutable fills and order aggregates.
pub struct FillRecorder {
    store: Arc<OrderStore>,
}

impl FillRecorder {
    /// Create a recorder over the given order table.
    #[must_use]
    pub const fn new(store: Arc<OrderStore>) -> Self {
        Self { store }
    }

    /// Ingest one execution report for an order.
    ///
    /// Duplicate reports (same `external_fill_id`) are logged and ignored;
    /// the existing fill is returned so callers see the correct state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExecutionReport` for malformed reports,
    /// `OrderNotFound` for unknown orders, the order's own error when the
    /// fill is not applicable, and `IntegrityViolation` when the
    /// filled-quantity invariant breaks.
    pub async fn ingest(
        &self,
        order_id: OrderId,
        report: &ExecutionReport,
    ) -> Result<IngestOutcome, RecorderError> {
        let mut order = self
            .store
            .lock(order_id)
            .await
            .ok_or(RecorderError::OrderNotFound(order_id))?;
        self.ingest_into(&mut order, report)
    }

    /// Ingest a report into an order the caller has already locked.
    ///
    /// Used by the reconcile path, which holds the order's exclusive
    /// section across the venue query and the resulting mutations.
    ///
    /// # Errors
    ///
    /// Same contract as [`FillRecorder::ingest`].
    pub fn ingest_into(
        &self,
        order: &mut Order,
        report: &ExecutionReport,
    ) -> Result<IngestOutcome, RecorderError> {
        validate_report(report)?;
        let order_id = order.id();

        if let Some(existing) = order.fill_state().find_by_external_id(&report.external_fill_id) {
            tracing::warn!(
                order_id = %order_id,
                external_fill_id = %report.external_fill_id,
                "DuplicateFillIgnored: execution report already recorded"
            );
            return Ok(IngestOutcome {
                fill: existing.clone(),
                order_status: order.status(),
                duplicate: true,
            });
        }

        let fill = Fill::new(
            self.store.allocate_fill_id(),
            order_id,
            report.quantity,
            report.price,
            report.fill_time,
        )
        .with_external_id(report.external_fill_id.clone())
        .with_commission(report.commission, report.commission_asset.clone())
        .with_liquidity(report.liquidity);
        let fill = match &report.counterparty {
            Some(counterparty) => fill.with_counterparty(counterparty.clone()),
            None => fill,
        };

        order.record_fill(fill.clone())?;

        if !order.fill_state().verify_integrity() {
            tracing::error!(
                order_id = %order_id,
                filled = %order.filled_quantity(),
                "Fill integrity alarm: filled quantity diverged from recorded fills"
            );
            return Err(RecorderError::IntegrityViolation {
                order_id,
                details: format!(
                    "filled={}, fills={}",
                    order.filled_quantity(),
                    order.fill_state().fills().len()
                ),
            });
        }

        tracing::info!(
            order_id = %order_id,
            external_fill_id = %report.external_fill_id,
            quantity = %report.quantity,
            price = %report.price,
            status = %order.status(),
            "Fill recorded"
        );

        Ok(IngestOutcome {
            fill,
            order_status: order.status(),
            duplicate: false,
        })
    }
}

fn validate_report(report: &ExecutionReport) -> Result<(), RecorderError> {
    if !report.quantity.is_positive() {
        return Err(RecorderError::InvalidExecutionReport {
            field: "quantity".to_string(),
            message: "Fill quantity must be positive".to_string(),
        });
    }
    if !report.price.is_positive() {
        return Err(RecorderError::InvalidExecutionReport {
            field: "price".to_string(),
            message: "Fill price must be positive".to_string(),
        });
    }
    if report.commission.is_negative() {
        return Err(RecorderError::InvalidExecutionReport {
            field: "commission".to_string(),
            message: "Commission cannot be negative".to_string(),
        });
    }
    if report.fill_time > Timestamp::now() {
        return Err(RecorderError::InvalidExecutionReport {
            field: "fill_time".to_string(),
            message: "Fill time cannot be in the future".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orders::aggregate::CreateOrderCommand;
    use crate::domain::orders::value_objects::{LiquidityType, OrderSide, OrderType};
    use crate::domain::shared::{Money, Quantity, Symbol, VenueOrderId};

    fn make_report(external_id: &str, qty: i64, price: f64) -> ExecutionReport {
        ExecutionReport {
            external_fill_id: external_id.to_string(),
            quantity: Quantity::from_i64(qty),
            price: Money::from_f64(price),
            commission: Money::from_f64(0.10),
            commission_asset: Some("USD".to_string()),
            liquidity: LiquidityType::Taker,
            counterparty: None,
            fill_time: Timestamp::now(),
        }
    }

    async fn routed_order(store: &Arc<OrderStore>, quantity: i64) -> OrderId {
        let cmd = CreateOrderCommand::new(
            Symbol::new("NASDAQ:AAPL"),
            OrderSide::Buy,
            OrderType::Limit {
                price: Money::from_f64(100.0),
            },
            Quantity::from_i64(quantity),
        );
        let order = store.create(cmd).unwrap();
        let id = order.id();

        let mut guard = store.lock(id).await.unwrap();
        guard.set_risk_result(true, "");
        guard.mark_submitted(VenueOrderId::new("v-1")).unwrap();
        guard.mark_accepted().unwrap();
        id
    }

    #[tokio::test]
    async fn ingest_records_fill_and_updates_order() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));
        let order_id = routed_order(&store, 10).await;

        let outcome = recorder
            .ingest(order_id, &make_report("x-1", 4, 99.0))
            .await
            .unwrap();

        assert!(!outcome.duplicate);
        assert_eq!(outcome.order_status, OrderStatus::PartiallyFilled);

        let order = store.get(order_id).await.unwrap();
        assert_eq!(order.filled_quantity(), Quantity::from_i64(4));
        assert_eq!(order.commission(), Money::from_f64(0.10));
    }

    #[tokio::test]
    async fn duplicate_report_is_ignored_idempotently() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));
        let order_id = routed_order(&store, 10).await;
        let report = make_report("x-1", 4, 99.0);

        let first = recorder.ingest(order_id, &report).await.unwrap();
        let second = recorder.ingest(order_id, &report).await.unwrap();

        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(second.fill.id, first.fill.id);

        let order = store.get(order_id).await.unwrap();
        // Exactly one fill and one increment.
        assert_eq!(order.fill_state().fills().len(), 1);
        assert_eq!(order.filled_quantity(), Quantity::from_i64(4));
    }

    #[tokio::test]
    async fn zero_quantity_report_rejected() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));
        let order_id = routed_order(&store, 10).await;

        let err = recorder
            .ingest(order_id, &make_report("x-1", 0, 99.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RecorderError::InvalidExecutionReport { ref field, .. } if field == "quantity"
        ));
    }

    #[tokio::test]
    async fn negative_price_report_rejected() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));
        let order_id = routed_order(&store, 10).await;

        let err = recorder
            .ingest(order_id, &make_report("x-1", 4, -1.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RecorderError::InvalidExecutionReport { ref field, .. } if field == "price"
        ));
    }

    #[tokio::test]
    async fn unknown_order_rejected() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));

        let err = recorder
            .ingest(OrderId::new(999), &make_report("x-1", 4, 99.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn overfill_propagates_order_error() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));
        let order_id = routed_order(&store, 10).await;

        let err = recorder
            .ingest(order_id, &make_report("x-1", 11, 99.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::Order(OrderError::OverFill { .. })));
    }

    #[tokio::test]
    async fn fills_complete_the_order() {
        let store = Arc::new(OrderStore::new());
        let recorder = FillRecorder::new(Arc::clone(&store));
        let order_id = routed_order(&store, 10).await;

        recorder
            .ingest(order_id, &make_report("x-1", 4, 99.0))
            .await
            .unwrap();
        let outcome = recorder
            .ingest(order_id, &make_report("x-2", 6, 101.0))
            .await
            .unwrap();

        assert_eq!(outcome.order_status, OrderStatus::Filled);
        let order = store.get(order_id).await.unwrap();
        assert_eq!(order.avg_fill_price(), Money::from_f64(100.2));
        assert!(order.filled_at().is_some());
    }
}
