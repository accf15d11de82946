//! Venue connector implementations.

mod mock;

pub use mock::{MockFillMode, MockVenueConnector};
