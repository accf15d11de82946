//! Time in force for orders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time in force specifying order validity duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Valid for the current trading day only.
    Day,
    /// Good-til-cancelled.
    Gtc,
    /// Immediate-or-cancel (fill what is possible, cancel the remainder).
    Ioc,
    /// Fill-or-kill (complete fill immediately or reject).
    Fok,
    /// Good-til-date; requires an expire time in the future at creation.
    Gtd,
}

impl TimeInForce {
    /// Returns true if the order requires immediate execution.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Ioc | Self::Fok)
    }

    /// Returns true if this time in force requires an expire time.
    #[must_use]
    pub const fn requires_expire_time(&self) -> bool {
        matches!(self, Self::Gtd)
    }
}

impl Default for TimeInForce {
    fn default() -> Self {
        Self::Day
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "DAY"),
            Self::Gtc => write!(f, "GTC"),
            Self::Ioc => write!(f, "IOC"),
            Self::Fok => write!(f, "FOK"),
            Self::Gtd => write!(f, "GTD"),
        }
    }
}
