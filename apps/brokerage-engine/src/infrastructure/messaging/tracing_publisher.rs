//! Event publisher that writes every domain event to the log stream.
//!
//! Each event is emitted as one structured `info` record with the event
//! serialized as JSON, so a log shipper can forward it downstream.

use async_trait::async_trait;

use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::order_execution::events::OrderEvent;

/// Publishes order events as structured tracing records.
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// Create a new publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisherPort for TracingEventPublisher {
    async fn publish_order_events(&self, events: Vec<OrderEvent>) -> Result<(), EventPublishError> {
        for event in &events {
            let payload =
                serde_json::to_string(event).map_err(|e| EventPublishError::SerializationError {
                    message: e.to_string(),
                })?;
            tracing::info!(
                target: "brokerage_engine::events",
                event_type = event.event_type(),
                order_id = %event.order_id(),
                occurred_at = %event.occurred_at(),
                payload = %payload,
                "Domain event"
            );
        }
        Ok(())
    }
}
