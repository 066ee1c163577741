//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.
//! Every mutating use case reads, decides, and commits its order row and
//! balance rows in one conditional transaction, retrying on conflict.

mod cancel_order;
mod create_order;
mod list_assets;
mod list_orders;
mod match_order;

pub use cancel_order::CancelOrderUseCase;
pub use create_order::CreateOrderUseCase;
pub use list_assets::ListAssetsUseCase;
pub use list_orders::ListOrdersUseCase;
pub use match_order::MatchOrderUseCase;
