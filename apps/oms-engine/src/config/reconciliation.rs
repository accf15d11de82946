//! Reconciliation loop configuration.

use serde::{Deserialize, Serialize};

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Whether the background loop runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Poll interval in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_interval_secs() -> u64 {
    5
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
        }
    }
}
