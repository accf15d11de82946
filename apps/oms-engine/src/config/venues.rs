//! Venue routing configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Venue routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenuesConfig {
    /// Fallback venue for unrouted symbols.
    #[serde(default = "default_venue_name")]
    pub default_venue: String,
    /// Bounded timeout for venue calls, in seconds.
    #[serde(default = "default_venue_timeout_secs")]
    pub venue_timeout_secs: u64,
    /// Symbol-to-venue routes.
    #[serde(default)]
    pub routes: HashMap<String, String>,
    /// Mock venue settings.
    #[serde(default)]
    pub mock: MockVenueConfig,
}

fn default_venue_name() -> String {
    "mock".to_string()
}

const fn default_venue_timeout_secs() -> u64 {
    5
}

impl Default for VenuesConfig {
    fn default() -> Self {
        Self {
            default_venue: default_venue_name(),
            venue_timeout_secs: default_venue_timeout_secs(),
            routes: HashMap::new(),
            mock: MockVenueConfig::default(),
        }
    }
}

/// Mock venue behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockVenueConfig {
    /// Account the mock trades under.
    #[serde(default = "default_mock_account")]
    pub account_id: String,
    /// Fill behavior: "immediate", "sliced", or "resting".
    #[serde(default = "default_fill_mode")]
    pub fill_mode: String,
    /// Slice count for "sliced" mode.
    #[serde(default = "default_slices")]
    pub slices: u32,
    /// Price assumed for orders without a limit price.
    #[serde(default = "default_mark_price")]
    pub mark_price: f64,
}

fn default_mock_account() -> String {
    "demo".to_string()
}

fn default_fill_mode() -> String {
    "immediate".to_string()
}

const fn default_slices() -> u32 {
    2
}

const fn default_mark_price() -> f64 {
    100.0
}

impl Default for MockVenueConfig {
    fn default() -> Self {
        Self {
            account_id: default_mock_account(),
            fill_mode: default_fill_mode(),
            slices: default_slices(),
            mark_price: default_mark_price(),
        }
    }
}
