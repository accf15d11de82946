//! Ports: interfaces to systems outside the OMS boundary.

mod account_port;
mod venue_port;

pub use account_port::{AccountDataPort, StaticAccountData};
pub use venue_port::{
    ExecutionReport, VenueConnector, VenueError, VenueOrderSnapshot, VenueOrderStatus,
    VenueSubmitRequest,
};
