//! Order value objects.

mod order_side;
mod order_status;

pub use order_side::OrderSide;
pub use order_status::OrderStatus;
