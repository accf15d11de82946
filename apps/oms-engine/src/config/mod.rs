//! Configuration loading and validation.
//!
//! YAML configuration with `${VAR}` / `${VAR:-default}` environment
//! variable interpolation. Every section has serde defaults so a missing
//! or partial file still yields a runnable engine.

mod observability;
mod reconciliation;
mod risk;
mod server;
mod venues;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::ObservabilityConfig;
pub use reconciliation::ReconciliationConfig;
pub use risk::{AccountConfig, RiskConfig};
pub use server::ServerConfig;
pub use venues::{MockVenueConfig, VenuesConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse the YAML.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration is structurally valid but semantically wrong.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Risk validator and demo account.
    #[serde(default)]
    pub risk: RiskConfig,
    /// Venue routing.
    #[serde(default)]
    pub venues: VenuesConfig,
    /// Reconciliation loop.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Logging.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Load configuration from a YAML file with env interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or
/// validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
///
/// Unset variables without a default interpolate to an empty string.
fn interpolate_env_vars(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let expr = &after[..end];
        let (name, default) = match expr.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (expr, None),
        };

        match std::env::var(name) {
            Ok(value) => output.push_str(&value),
            Err(_) => output.push_str(default.unwrap_or("")),
        }

        rest = &after[end + 1..];
    }

    output.push_str(rest);
    output
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }
    if config.risk.price_band_pct <= 0.0 || config.risk.price_band_pct > 1.0 {
        return Err(ConfigError::ValidationError(
            "risk.price_band_pct must be within (0, 1]".to_string(),
        ));
    }
    if config.venues.venue_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "venues.venue_timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.reconciliation.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "reconciliation.interval_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}
