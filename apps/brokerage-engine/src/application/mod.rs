//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for the ledger store and event sink
//! - **Services**: The balance reservation engine and conflict retry
//! - **Use Cases**: Create, cancel, match and list operations
//! - **DTOs**: Data transfer objects for API boundaries

pub mod dto;
pub mod errors;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use errors::LedgerError;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
