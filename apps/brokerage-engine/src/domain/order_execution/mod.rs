//! Order Execution Bounded Context
//!
//! Owns the order lifecycle: an order is placed PENDING together with a
//! balance reservation, then transitions exactly once to MATCHED or
//! CANCELED.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: root entity guarding status transitions
//! - **Balance Legs**: which balance line an order reserves, consumes and credits
//! - **Domain Events**: drained after each committed transition

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;

pub use aggregate::{BalanceLeg, Order, PlaceOrderCommand, ReconstitutedOrderParams, Settlement};
pub use errors::OrderError;
pub use events::{OrderCanceled, OrderCreated, OrderEvent, OrderMatched};
pub use services::OrderStateMachine;
pub use value_objects::{OrderSide, OrderStatus};
