//! Order provenance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an order originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSource {
    /// Entered manually by a trader.
    Manual,
    /// Emitted by a strategy.
    Strategy,
    /// Emitted by an execution algorithm (e.g. a parent slicer).
    Algorithm,
}

impl Default for OrderSource {
    fn default() -> Self {
        Self::Manual
    }
}

impl fmt::Display for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "MANUAL"),
            Self::Strategy => write!(f, "STRATEGY"),
            Self::Algorithm => write!(f, "ALGORITHM"),
        }
    }
}
