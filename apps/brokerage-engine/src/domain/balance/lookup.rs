//! Get-or-create lookup result for settlement credits.

use super::aggregate::Asset;
use super::errors::BalanceError;
use crate::domain::shared::{CustomerId, Quantity, Symbol};

/// Result of looking up a balance line that may not exist yet.
///
/// Settlement credits the counter-asset of a matched order, which the
/// customer may never have held before. Both arms end in a credited line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceLookup {
    /// The line exists.
    Found(Asset),
    /// No line for this (customer, symbol) yet.
    Absent,
}

impl BalanceLookup {
    /// Version a conditional write must match, `None` for insert-if-absent.
    #[must_use]
    pub const fn expected_version(&self) -> Option<u64> {
        match self {
            Self::Found(asset) => Some(asset.version()),
            Self::Absent => None,
        }
    }

    /// Credit `amount`, opening a fresh line when none exists.
    ///
    /// # Errors
    ///
    /// Returns a `BalanceError` if the amount is not positive or overflows.
    pub fn settle_credit(
        self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
        amount: Quantity,
    ) -> Result<Asset, BalanceError> {
        match self {
            Self::Found(mut asset) => {
                asset.settle_credit(amount)?;
                Ok(asset)
            }
            Self::Absent => {
                if !amount.is_positive() {
                    return Err(BalanceError::NonPositiveAmount {
                        asset: asset_name.clone(),
                        amount,
                    });
                }
                Asset::open(customer_id.clone(), asset_name.clone(), amount)
            }
        }
    }
}

impl From<Option<Asset>> for BalanceLookup {
    fn from(value: Option<Asset>) -> Self {
        value.map_or(Self::Absent, Self::Found)
    }
}
