//! Risk validator and demo account configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Risk validator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Allowed limit-price deviation from reference, as a fraction.
    #[serde(default = "default_price_band_pct")]
    pub price_band_pct: f64,
    /// Duplicate-order window in seconds.
    #[serde(default = "default_duplicate_window_secs")]
    pub duplicate_window_secs: i64,
    /// Account snapshot used by the in-memory account adapter.
    #[serde(default)]
    pub account: AccountConfig,
}

const fn default_price_band_pct() -> f64 {
    0.20
}

const fn default_duplicate_window_secs() -> i64 {
    30
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            price_band_pct: default_price_band_pct(),
            duplicate_window_secs: default_duplicate_window_secs(),
            account: AccountConfig::default(),
        }
    }
}

/// Demo account snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Available buying power.
    #[serde(default = "default_buying_power")]
    pub buying_power: f64,
    /// Per-order value cap.
    #[serde(default)]
    pub max_order_value: Option<f64>,
    /// Per-symbol position limits.
    #[serde(default)]
    pub position_limits: HashMap<String, f64>,
    /// Per-symbol reference prices.
    #[serde(default)]
    pub reference_prices: HashMap<String, f64>,
}

const fn default_buying_power() -> f64 {
    1_000_000.0
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            buying_power: default_buying_power(),
            max_order_value: None,
            position_limits: HashMap::new(),
            reference_prices: HashMap::new(),
        }
    }
}
