//! OMS Engine Binary
//!
//! Starts the order management engine with the configured venue
//! connectors and the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin oms-engine
//! ```
//!
//! # Environment Variables
//!
//! - `OMS_CONFIG`: Path to the YAML config file (default: config.yaml;
//!   missing file falls back to built-in defaults)
//! - `RUST_LOG`: Log filter (overrides `observability.log_level`)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use oms_engine::config::{load_config, Config, MockVenueConfig};
use oms_engine::execution::recorder::FillRecorder;
use oms_engine::execution::router::{ExecutionRouter, VenueRegistry};
use oms_engine::execution::service::{ExecutionService, ServiceConfig};
use oms_engine::execution::store::OrderStore;
use oms_engine::observability::init_tracing;
use oms_engine::{
    AccountContext, AccountId, AppState, MockFillMode, MockVenueConnector, Money, Quantity,
    RiskLimits, RiskValidator, StaticAccountData, Symbol,
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = resolve_config();
    init_tracing(&config.observability.log_level);

    tracing::info!(
        http_port = config.server.http_port,
        default_venue = %config.venues.default_venue,
        "Starting OMS engine"
    );

    let service = build_service(&config);
    service.start().await;

    let state = AppState {
        service: Arc::clone(&service),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let router = oms_engine::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.http_port)
        .parse()
        .context("invalid server bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "HTTP API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    service.stop().await;
    tracing::info!("OMS engine shut down");

    Ok(())
}

/// Load the config file, falling back to defaults when it is absent.
fn resolve_config() -> Config {
    let path = std::env::var("OMS_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    match load_config(Some(&path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config '{path}' not usable ({e}); using built-in defaults");
            Config::default()
        }
    }
}

/// Wire the engine from configuration.
fn build_service(config: &Config) -> Arc<ExecutionService> {
    let store = Arc::new(OrderStore::new());
    let recorder = Arc::new(FillRecorder::new(Arc::clone(&store)));

    let validator = RiskValidator::new(RiskLimits {
        price_band: Decimal::try_from(config.risk.price_band_pct)
            .unwrap_or_else(|_| Decimal::new(20, 2)),
        duplicate_window_secs: config.risk.duplicate_window_secs,
    });

    let accounts = Arc::new(StaticAccountData::new(account_context(config)));

    let mut registry = VenueRegistry::new();
    registry.register(Arc::new(build_mock_venue(&config.venues.mock)));
    registry.set_default_venue(config.venues.default_venue.clone());
    for (symbol, venue) in &config.venues.routes {
        registry.add_route(Symbol::new(symbol.clone()), venue.clone());
    }
    let venues = Arc::new(registry);

    let router = Arc::new(ExecutionRouter::new(
        Arc::clone(&store),
        Arc::clone(&recorder),
        validator,
        accounts,
        Arc::clone(&venues),
        Duration::from_secs(config.venues.venue_timeout_secs),
        config.risk.duplicate_window_secs,
    ));

    Arc::new(ExecutionService::new(
        store,
        router,
        recorder,
        venues,
        ServiceConfig {
            reconcile_enabled: config.reconciliation.enabled,
            reconcile_interval: Duration::from_secs(config.reconciliation.interval_secs),
            report_queue_capacity: 1024,
        },
    ))
}

fn account_context(config: &Config) -> AccountContext {
    let account = &config.risk.account;
    let mut ctx = AccountContext::with_buying_power(Money::from_f64(account.buying_power));
    ctx.max_order_value = account.max_order_value.map(Money::from_f64);
    ctx.position_limits = decimal_map(&account.position_limits)
        .into_iter()
        .map(|(symbol, value)| (symbol, Quantity::new(value)))
        .collect();
    ctx.reference_prices = decimal_map(&account.reference_prices)
        .into_iter()
        .map(|(symbol, value)| (symbol, Money::new(value)))
        .collect();
    ctx
}

fn decimal_map(values: &HashMap<String, f64>) -> Vec<(Symbol, Decimal)> {
    values
        .iter()
        .filter_map(|(symbol, value)| {
            Decimal::try_from(*value)
                .ok()
                .map(|d| (Symbol::new(symbol.clone()), d))
        })
        .collect()
}

fn build_mock_venue(config: &MockVenueConfig) -> MockVenueConnector {
    let fill_mode = match config.fill_mode.as_str() {
        "sliced" => MockFillMode::Sliced(config.slices),
        "resting" => MockFillMode::Resting,
        _ => MockFillMode::Immediate,
    };

    MockVenueConnector::new("mock", AccountId::new(config.account_id.clone()))
        .with_fill_mode(fill_mode)
        .with_mark_price(Money::from_f64(config.mark_price))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
