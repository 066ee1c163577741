//! Brokerage Engine Binary
//!
//! Starts the balance reservation and order lifecycle service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin brokerage-engine
//! ```
//!
//! # Environment Variables
//!
//! - `BROKERAGE_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//!
//! Any `${VAR}` placeholder in the config file is read from the environment,
//! after loading `.env` from the current or an ancestor directory.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use brokerage_engine::config::{Config, load_config};
use brokerage_engine::infrastructure::config::Container;
use brokerage_engine::infrastructure::http::{AppState, create_router};
use brokerage_engine::infrastructure::messaging::TracingEventPublisher;
use brokerage_engine::infrastructure::persistence::InMemoryLedgerStore;
use brokerage_engine::observability::{MetricsConfig, init_metrics};
use brokerage_engine::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;

/// Concrete container for the in-memory deployment.
type EngineContainer = Container<InMemoryLedgerStore, TracingEventPublisher>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path = std::env::var("BROKERAGE_CONFIG").ok();
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;

    init_telemetry(&config.observability.logging).context("failed to initialize tracing")?;

    tracing::info!("Starting Brokerage Engine");
    log_config(&config);

    if config.server.metrics_enabled {
        let addr = socket_addr(&config.server.bind_address, config.server.metrics_port)?;
        init_metrics(&MetricsConfig::with_addr(addr))
            .context("failed to start metrics exporter")?;
    }

    let container = Container::in_memory(&config);
    container
        .seed_demo_data(&config.seed)
        .await
        .context("failed to seed demo balances")?;

    let app = create_router(create_state(&container));
    let http_addr = socket_addr(&config.server.bind_address, config.server.http_port)?;
    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health");
    tracing::info!("  GET    /api/v1/assets");
    tracing::info!("  POST   /api/v1/orders");
    tracing::info!("  GET    /api/v1/orders");
    tracing::info!("  DELETE /api/v1/orders/{{order_id}}");
    tracing::info!("  POST   /api/v1/orders/{{order_id}}/match");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Brokerage engine stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        metrics_enabled = config.server.metrics_enabled,
        metrics_port = config.server.metrics_port,
        base_currency = %config.ledger.base_currency,
        max_attempts = config.ledger.retry.max_attempts,
        seed_enabled = config.seed.enabled,
        "Configuration loaded"
    );
}

/// Build the HTTP state from the container.
fn create_state(container: &EngineContainer) -> AppState<InMemoryLedgerStore, TracingEventPublisher> {
    AppState {
        create_order: Arc::new(container.create_order_use_case()),
        cancel_order: Arc::new(container.cancel_order_use_case()),
        match_order: Arc::new(container.match_order_use_case()),
        list_orders: Arc::new(container.list_orders_use_case()),
        list_assets: Arc::new(container.list_assets_use_case()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn socket_addr(bind_address: &str, port: u16) -> anyhow::Result<SocketAddr> {
    format!("{bind_address}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {bind_address}:{port}"))
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// If a handler cannot be installed that branch never resolves, leaving
/// the other signal as the only trigger.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
