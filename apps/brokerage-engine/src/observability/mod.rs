//! Observability module for metrics.
//!
//! Prometheus counters and histograms for the order lifecycle, rejected
//! requests and optimistic-concurrency retries.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_conflict_retry, record_http_request,
    record_order_canceled, record_order_created, record_order_matched, record_order_rejection,
};
