//! HTTP response types and error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::dto::{FillView, OrderView};
use crate::domain::orders::errors::OrderError;
use crate::domain::risk::RiskCheckResult;
use crate::execution::recorder::RecorderError;
use crate::execution::router::RouterError;
use crate::execution::service::ServiceError;

/// Health probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process answers.
    pub status: String,
    /// Build version.
    pub version: String,
}

/// Body returned when an order is created.
#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    /// The order in its post-routing state.
    pub order: OrderView,
    /// The risk result when the gate failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskCheckResult>,
    /// Routing failure surfaced as degraded status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_error: Option<String>,
}

/// Body wrapping a single order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// The order.
    pub order: OrderView,
}

/// Body for order listings.
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    /// One page of matching orders.
    pub orders: Vec<OrderView>,
    /// Total matches before pagination.
    pub total: usize,
    /// Applied page size.
    pub limit: usize,
    /// Applied page offset.
    pub offset: usize,
}

/// Body for fill listings, fill_time ascending.
#[derive(Debug, Serialize)]
pub struct FillsResponse {
    /// The order's fills.
    pub fills: Vec<FillView>,
}

/// Error body for all failure responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// API-level error with its HTTP mapping.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// 404 with `ORDER_NOT_FOUND`.
    #[must_use]
    pub fn order_not_found(id: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "ORDER_NOT_FOUND",
            message: format!("Order not found: {id}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let (status, code) = match &err {
            OrderError::InvalidOrderSpec { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ORDER_SPEC")
            }
            OrderError::OrderNotEditable { .. } => (StatusCode::CONFLICT, "ORDER_NOT_EDITABLE"),
            OrderError::QuantityBelowFilled { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "QUANTITY_BELOW_FILLED")
            }
            OrderError::OverFill { .. } => (StatusCode::CONFLICT, "OVER_FILL"),
            OrderError::InvalidStateTransition { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            OrderError::RiskCheckNotPassed => (StatusCode::CONFLICT, "RISK_CHECK_NOT_PASSED"),
            OrderError::NotFound { .. } => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::Order(e) => e.into(),
            RouterError::NoAvailableVenue { .. } => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "NO_AVAILABLE_VENUE",
                message: err.to_string(),
            },
            RouterError::VenueTimeout { .. } => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                code: "VENUE_TIMEOUT",
                message: err.to_string(),
            },
            RouterError::Venue(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                code: "VENUE_ERROR",
                message: err.to_string(),
            },
            RouterError::OrderNotFound(id) => Self::order_not_found(id),
        }
    }
}

impl From<RecorderError> for ApiError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::Order(e) => e.into(),
            RecorderError::OrderNotFound(id) => Self::order_not_found(id),
            RecorderError::InvalidExecutionReport { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "INVALID_EXECUTION_REPORT",
                message: err.to_string(),
            },
            RecorderError::IntegrityViolation { .. } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "INTEGRITY_VIOLATION",
                message: err.to_string(),
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotRunning => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "SERVICE_NOT_RUNNING",
                message: err.to_string(),
            },
            ServiceError::Router(e) => e.into(),
            ServiceError::Order(e) => e.into(),
            ServiceError::Recorder(e) => e.into(),
        }
    }
}
