//! Value objects for the order lifecycle context.

mod fill;
mod fill_state;
mod order_side;
mod order_status;
mod order_type;
mod priority;
mod source;
mod time_in_force;

pub use fill::{Fill, LiquidityType};
pub use fill_state::FillState;
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::{OrderKind, OrderType, TrailOffset};
pub use priority::OrderPriority;
pub use source::OrderSource;
pub use time_in_force::TimeInForce;
