//! Order priority for routing and queue selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing priority.
///
/// Influences venue and queue selection only; it never affects
/// state-machine timing or time-in-force semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPriority {
    /// Background priority.
    Low,
    /// Default priority.
    Normal,
    /// Elevated priority.
    High,
    /// Highest priority.
    Urgent,
}

impl Default for OrderPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Normal => write!(f, "NORMAL"),
            Self::High => write!(f, "HIGH"),
            Self::Urgent => write!(f, "URGENT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering() {
        assert!(OrderPriority::Urgent > OrderPriority::High);
        assert!(OrderPriority::High > OrderPriority::Normal);
        assert!(OrderPriority::Normal > OrderPriority::Low);
    }

    #[test]
    fn priority_default() {
        assert_eq!(OrderPriority::default(), OrderPriority::Normal);
    }

    #[test]
    fn priority_serde() {
        let json = serde_json::to_string(&OrderPriority::Urgent).unwrap();
        assert_eq!(json, "\"URGENT\"");
    }
}
