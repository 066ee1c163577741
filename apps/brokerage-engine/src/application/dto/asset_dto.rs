//! Asset DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::balance::Asset;

/// Projection of one balance line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDto {
    /// Asset line ID.
    pub id: String,
    /// Owning customer.
    pub customer_id: String,
    /// Symbol held.
    pub asset_name: String,
    /// Total quantity owned.
    pub size: Decimal,
    /// Quantity not reserved by pending orders.
    pub usable_size: Decimal,
}

impl From<&Asset> for AssetDto {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id().to_string(),
            customer_id: asset.customer_id().to_string(),
            asset_name: asset.asset_name().to_string(),
            size: asset.size().amount(),
            usable_size: asset.usable_size().amount(),
        }
    }
}
