//! Domain services for the order lifecycle context.

mod state_machine;

pub use state_machine::OrderStateMachine;
