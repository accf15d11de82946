//! Shared domain kernel: value objects and domain-level errors.

mod errors;
mod value_objects;

pub use errors::DomainError;
pub use value_objects::{
    AccountId, BacktestId, FillId, Money, OrderId, Quantity, StrategyId, Symbol, Timestamp,
    VenueOrderId,
};
