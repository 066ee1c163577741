// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Brokerage Engine - Rust Core Library
//!
//! Balance reservation and order lifecycle engine for a brokerage.
//! Customers hold balance lines per asset; placing an order reserves the
//! funds it needs, canceling releases them, and matching settles them.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `balance`: Asset aggregate with the `0 ≤ usable_size ≤ size` invariant
//!   - `order_execution`: Order aggregate, PENDING → MATCHED | CANCELED lifecycle
//!   - `shared`: identifiers, decimal quantities, symbols, caller identity
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`LedgerStore`, `EventPublisherPort`)
//!   - `services`: `BalanceReservationEngine`, conflict retry
//!   - `use_cases`: `CreateOrder`, `CancelOrder`, `MatchOrder`, `ListOrders`, `ListAssets`
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: versioned in-memory ledger store
//!   - `http`: axum REST adapter
//!   - `messaging`: tracing event publisher
//!   - `config`: Dependency injection container and demo data seeding

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration loading and validation.
pub mod config;

/// Stable error codes and HTTP error bodies.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::errors::LedgerError;
pub use application::services::{BalanceReservationEngine, ConflictRetryPolicy};
pub use domain::balance::Asset;
pub use domain::order_execution::{Order, OrderSide, OrderStatus};
pub use domain::shared::{CustomerId, Money, OrderId, Principal, Quantity, Symbol, Timestamp};
pub use error::{BrokerageError, ErrorCode};
