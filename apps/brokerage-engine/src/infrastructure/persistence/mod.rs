//! Persistence Adapters
//!
//! Implementations of the `LedgerStore` port.

pub mod in_memory;

pub use in_memory::InMemoryLedgerStore;
