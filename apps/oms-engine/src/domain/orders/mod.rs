//! Order lifecycle bounded context.
//!
//! The canonical representation of a client order and its derived state,
//! plus the forward-only state machine governing lifecycle transitions.

pub mod aggregate;
pub mod errors;
pub mod services;
pub mod value_objects;
