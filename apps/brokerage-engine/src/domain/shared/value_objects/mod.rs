//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod identifiers;
mod money;
mod principal;
mod quantity;
mod symbol;
mod timestamp;

pub use identifiers::{AssetId, CustomerId, OrderId};
pub use money::Money;
pub use principal::Principal;
pub use quantity::Quantity;
pub use symbol::Symbol;
pub use timestamp::Timestamp;
