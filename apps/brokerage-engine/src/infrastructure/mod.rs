//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer. Following
//! hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**
//!   - `persistence/`: ledger store implementations
//!   - `messaging/`: event publishing adapters
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: REST API controllers
//!
//! - **Wiring**
//!   - `config/`: dependency injection container and demo data seeding

pub mod config;
pub mod http;
pub mod messaging;
pub mod persistence;
