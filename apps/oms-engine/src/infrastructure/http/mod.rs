//! HTTP adapter: axum router, request/response types, error mapping.

mod controller;
mod request;
mod response;

pub use controller::{create_router, AppState};
pub use request::ListOrdersParams;
pub use response::{
    ApiError, ErrorBody, FillsResponse, HealthResponse, ListOrdersResponse, OrderCreatedResponse,
    OrderResponse,
};
