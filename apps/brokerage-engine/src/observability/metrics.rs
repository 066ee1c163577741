//! Prometheus metrics for the brokerage engine.
//!
//! Recording is always safe: without an installed recorder every call is a
//! no-op, which is what unit tests rely on.
//!
//! # Example
//!
//! ```ignore
//! use brokerage_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! record_order_created("buy");
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Default port of the metrics HTTP listener.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_METRICS_PORT),
            // Latency buckets from 100us to 1s
            latency_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Lifecycle Metrics
// ============================================================================

/// Record a newly placed order.
///
/// # Arguments
///
/// * `side` - Order side label ("buy" or "sell")
pub fn record_order_created(side: &str) {
    counter!("orders_created_total", "side" => side.to_string()).increment(1);
}

/// Record a canceled order.
pub fn record_order_canceled(side: &str) {
    counter!("orders_canceled_total", "side" => side.to_string()).increment(1);
}

/// Record a matched (settled) order.
pub fn record_order_matched(side: &str) {
    counter!("orders_matched_total", "side" => side.to_string()).increment(1);
}

/// Record a rejected request.
///
/// # Arguments
///
/// * `operation` - Operation that failed (e.g., `"create_order"`)
/// * `code` - Stable error code (e.g., `"ORDER_001"`)
pub fn record_order_rejection(operation: &str, code: &str) {
    counter!(
        "order_rejection_total",
        "operation" => operation.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Record one retry after a lost optimistic-concurrency race.
pub fn record_conflict_retry(operation: &str) {
    counter!("ledger_conflict_retries_total", "operation" => operation.to_string()).increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request.
///
/// # Arguments
///
/// * `route` - Route label (e.g., `"create_order"`)
/// * `status` - Response status code
/// * `latency_seconds` - Handler latency in seconds
pub fn record_http_request(route: &str, status: u16, latency_seconds: f64) {
    counter!(
        "http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("http_request_duration_seconds", "route" => route.to_string())
        .record(latency_seconds);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), DEFAULT_METRICS_PORT);
        assert!(!config.latency_buckets.is_empty());
    }

    #[test]
    fn test_config_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9191".parse().unwrap();
        let config = MetricsConfig::with_addr(addr);
        assert_eq!(config.listen_addr.port(), 9191);
    }

    #[test]
    fn test_latency_buckets_ascending() {
        let config = MetricsConfig::default();
        assert!(config.latency_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every call must be a no-op.
        record_order_created("buy");
        record_order_canceled("sell");
        record_order_matched("buy");
        record_order_rejection("create_order", "ORDER_001");
        record_conflict_retry("cancel_order");
        record_http_request("list_orders", 200, 0.002);
    }
}
