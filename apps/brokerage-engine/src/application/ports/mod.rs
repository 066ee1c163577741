//! Application Ports (Driven)
//!
//! Ports define how the application uses external systems.
//! - `LedgerStore`: durable, versioned storage for asset lines and orders
//! - `EventPublisherPort`: sink for domain events after commit

mod event_publisher_port;
mod ledger_store_port;

pub use event_publisher_port::{EventPublishError, EventPublisherPort, NoOpEventPublisher};
pub use ledger_store_port::{LedgerStore, LedgerTransaction, LedgerWrite, StoreError};
