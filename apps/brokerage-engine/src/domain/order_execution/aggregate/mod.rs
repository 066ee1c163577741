//! Order aggregate.

mod order;

pub use order::{BalanceLeg, Order, PlaceOrderCommand, ReconstitutedOrderParams, Settlement};
