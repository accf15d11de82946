//! HTTP controller (driver adapter).
//!
//! Axum-based JSON API over the execution service.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::application::dto::{CreateOrderRequest, FillView, OrderView, UpdateOrderRequest};
use crate::domain::shared::OrderId;
use crate::execution::service::ExecutionService;

use super::request::ListOrdersParams;
use super::response::{
    ApiError, FillsResponse, HealthResponse, ListOrdersResponse, OrderCreatedResponse,
    OrderResponse,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The execution service handle.
    pub service: Arc<ExecutionService>,
    /// Application version.
    pub version: String,
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders", post(create_order).get(list_orders))
        .route("/api/v1/orders/{id}", get(get_order).patch(update_order))
        .route("/api/v1/orders/{id}/cancel", post(cancel_order))
        .route("/api/v1/orders/{id}/suspend", post(suspend_order))
        .route("/api/v1/orders/{id}/resume", post(resume_order))
        .route("/api/v1/orders/{id}/fills", get(list_fills))
        .route("/api/v1/risk-check", post(risk_check))
        .route("/api/v1/service/status", get(service_status))
        .route("/api/v1/service/start", post(service_start))
        .route("/api/v1/service/stop", post(service_stop))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Create an order and route it.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = request.into_command()?;
    let response = state.service.place_order(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order: OrderView::from_order(&response.order),
            risk: response.risk,
            routing_error: response.routing_error,
        }),
    ))
}

/// Pre-submission risk check; no persistence.
async fn risk_check(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = request.into_command()?;
    let result = state.service.risk_check(cmd).await?;
    Ok(Json(result))
}

/// Partially update an active order.
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .service
        .update_order(OrderId::new(id), request.into_patch())
        .await?;
    Ok(Json(OrderResponse {
        order: OrderView::from_order(&order),
    }))
}

/// Cancel an order.
async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.cancel_order(OrderId::new(id)).await?;
    Ok(Json(OrderResponse {
        order: OrderView::from_order(&order),
    }))
}

/// Administratively suspend an order.
async fn suspend_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.suspend_order(OrderId::new(id)).await?;
    Ok(Json(OrderResponse {
        order: OrderView::from_order(&order),
    }))
}

/// Resume a suspended order.
async fn resume_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.resume_order(OrderId::new(id)).await?;
    Ok(Json(OrderResponse {
        order: OrderView::from_order(&order),
    }))
}

/// Fetch one order.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .service
        .get_order(OrderId::new(id))
        .await
        .ok_or_else(|| ApiError::order_not_found(id))?;
    Ok(Json(OrderResponse {
        order: OrderView::from_order(&order),
    }))
}

/// List orders with filters and pagination.
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> impl IntoResponse {
    let query = params.into_query();
    let page = state.service.list_orders(&query).await;

    Json(ListOrdersResponse {
        orders: page.orders.iter().map(OrderView::from_order).collect(),
        total: page.total,
        limit: query.limit,
        offset: query.offset,
    })
}

/// List an order's fills, fill_time ascending.
async fn list_fills(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let fills = state
        .service
        .list_fills(OrderId::new(id))
        .await
        .ok_or_else(|| ApiError::order_not_found(id))?;
    Ok(Json(FillsResponse {
        fills: fills.iter().map(FillView::from_fill).collect(),
    }))
}

/// Service status: lifecycle, venue health, counters.
async fn service_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.status().await)
}

/// Start accepting submissions.
async fn service_start(State(state): State<AppState>) -> impl IntoResponse {
    state.service.start().await;
    Json(state.service.status().await)
}

/// Stop accepting submissions; in-flight orders remain queryable.
async fn service_stop(State(state): State<AppState>) -> impl IntoResponse {
    state.service.stop().await;
    Json(state.service.status().await)
}
