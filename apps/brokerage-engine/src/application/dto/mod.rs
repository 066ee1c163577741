//! Data Transfer Objects (DTOs)
//!
//! Read-only projections of the aggregates and use case inputs.

mod asset_dto;
mod order_dto;

pub use asset_dto::AssetDto;
pub use order_dto::{CreateOrderDto, ListOrdersQuery, OrderDto};
