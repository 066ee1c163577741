//! Messaging adapters for domain events.

mod tracing_publisher;

pub use tracing_publisher::TracingEventPublisher;
