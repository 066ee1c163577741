//! Domain Layer
//!
//! Pure business logic for customer balances and the order lifecycle.
//! Nothing in here performs I/O; persistence and transport live behind
//! the application ports.
//!
//! # Bounded Contexts
//!
//! - `shared`: identifiers, quantities, prices, symbols, principals
//! - `balance`: the per-customer, per-symbol `Asset` balance line
//! - `order_execution`: the `Order` aggregate and its state machine

pub mod balance;
pub mod order_execution;
pub mod shared;
