//! Demo balances credited at startup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Seed configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Whether to credit the seed balances at startup.
    #[serde(default)]
    pub enabled: bool,
    /// Customers and their opening balances.
    #[serde(default)]
    pub customers: Vec<SeedCustomer>,
}

/// One seeded customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCustomer {
    /// Customer id.
    pub customer_id: String,
    /// Opening balances.
    #[serde(default)]
    pub balances: Vec<SeedBalance>,
}

/// One opening balance line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedBalance {
    /// Asset name.
    pub asset_name: String,
    /// Amount credited to both size and usable size.
    pub amount: Decimal,
}
