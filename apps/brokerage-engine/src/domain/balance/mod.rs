//! Balance Bounded Context
//!
//! One `Asset` per (customer, symbol) pair. A line tracks the total
//! quantity owned (`size`) and the part not committed to a pending order
//! (`usable_size`). Every mutation preserves `0 <= usable_size <= size`.
//!
//! # Operations
//!
//! - **reserve**: lock part of `usable_size` for a new order
//! - **release**: hand a reservation back when an order is canceled
//! - **settle credit**: add the proceeds of a matched order
//! - **settle debit**: consume a reservation when its order is matched

pub mod aggregate;
pub mod errors;
pub mod lookup;

pub use aggregate::{Asset, ReconstitutedAssetParams};
pub use errors::BalanceError;
pub use lookup::BalanceLookup;
