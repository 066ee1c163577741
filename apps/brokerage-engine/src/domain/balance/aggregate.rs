//! Asset Aggregate
//!
//! A single balance line. `size - usable_size` is the amount reserved by
//! the owner's pending orders against this symbol.

use serde::{Deserialize, Serialize};

use super::errors::BalanceError;
use crate::domain::shared::{AssetId, CustomerId, Quantity, Symbol};

/// Parameters for reconstituting an Asset from storage.
#[derive(Debug, Clone)]
pub struct ReconstitutedAssetParams {
    /// Asset line identifier.
    pub id: AssetId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Symbol held.
    pub asset_name: Symbol,
    /// Total quantity owned.
    pub size: Quantity,
    /// Quantity not reserved by pending orders.
    pub usable_size: Quantity,
    /// Optimistic concurrency version.
    pub version: u64,
}

/// Asset Aggregate Root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    customer_id: CustomerId,
    asset_name: Symbol,
    size: Quantity,
    usable_size: Quantity,
    version: u64,
}

impl Asset {
    /// Open a new balance line holding `amount`, all of it usable.
    ///
    /// The line is unversioned (version 0) until a store persists it.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` if `amount` is negative.
    pub fn open(
        customer_id: CustomerId,
        asset_name: Symbol,
        amount: Quantity,
    ) -> Result<Self, BalanceError> {
        if amount.is_negative() {
            return Err(BalanceError::NonPositiveAmount {
                asset: asset_name,
                amount,
            });
        }
        Ok(Self {
            id: AssetId::generate(),
            customer_id,
            asset_name,
            size: amount,
            usable_size: amount,
            version: 0,
        })
    }

    /// Reconstitute an asset line from stored state.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` if the stored amounts are inconsistent.
    pub fn reconstitute(params: ReconstitutedAssetParams) -> Result<Self, BalanceError> {
        let asset = Self {
            id: params.id,
            customer_id: params.customer_id,
            asset_name: params.asset_name,
            size: params.size,
            usable_size: params.usable_size,
            version: params.version,
        };
        asset.check_invariant()?;
        Ok(asset)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the asset line ID.
    #[must_use]
    pub const fn id(&self) -> &AssetId {
        &self.id
    }

    /// Get the owning customer.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Get the symbol held.
    #[must_use]
    pub const fn asset_name(&self) -> &Symbol {
        &self.asset_name
    }

    /// Total quantity owned.
    #[must_use]
    pub const fn size(&self) -> Quantity {
        self.size
    }

    /// Quantity not committed to pending orders.
    #[must_use]
    pub const fn usable_size(&self) -> Quantity {
        self.usable_size
    }

    /// Quantity committed to pending orders.
    #[must_use]
    pub fn reserved(&self) -> Quantity {
        Quantity::new(self.size.amount() - self.usable_size.amount())
    }

    /// Optimistic concurrency version of the stored row.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Set by the store after a successful conditional write.
    pub(crate) const fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Lock `amount` of the usable balance for a pending order.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` without mutating if `usable_size < amount`.
    pub fn reserve(&mut self, amount: Quantity) -> Result<(), BalanceError> {
        self.require_positive(amount)?;
        if self.usable_size < amount {
            return Err(BalanceError::InsufficientBalance {
                asset: self.asset_name.clone(),
                required: amount,
                available: self.usable_size,
            });
        }
        self.usable_size = self.usable_size.checked_sub(amount)?;
        Ok(())
    }

    /// Return `amount` to the usable balance, never beyond `size`.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` if `amount <= 0`.
    pub fn release(&mut self, amount: Quantity) -> Result<(), BalanceError> {
        self.require_positive(amount)?;
        let restored = self.usable_size.checked_add(amount)?;
        self.usable_size = restored.min(self.size);
        Ok(())
    }

    /// Add settled proceeds; the new quantity is immediately usable.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount` if `amount <= 0`, or an arithmetic error.
    pub fn settle_credit(&mut self, amount: Quantity) -> Result<(), BalanceError> {
        self.require_positive(amount)?;
        self.size = self.size.checked_add(amount)?;
        self.usable_size = self.usable_size.checked_add(amount)?;
        Ok(())
    }

    /// Consume `amount` that was reserved when the order was placed.
    ///
    /// Only `size` moves: the reservation already took it out of `usable_size`.
    ///
    /// # Errors
    ///
    /// Returns `ReservationShortfall` if less than `amount` is reserved.
    pub fn settle_debit(&mut self, amount: Quantity) -> Result<(), BalanceError> {
        self.require_positive(amount)?;
        let reserved = self.reserved();
        if reserved < amount {
            return Err(BalanceError::ReservationShortfall {
                asset: self.asset_name.clone(),
                required: amount,
                reserved,
            });
        }
        self.size = self.size.checked_sub(amount)?;
        Ok(())
    }

    /// Verify `0 <= usable_size <= size`.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the offending amounts.
    pub fn check_invariant(&self) -> Result<(), BalanceError> {
        if self.usable_size.is_negative() || self.usable_size > self.size {
            return Err(BalanceError::InvariantViolation {
                asset: self.asset_name.clone(),
                size: self.size,
                usable_size: self.usable_size,
            });
        }
        Ok(())
    }

    fn require_positive(&self, amount: Quantity) -> Result<(), BalanceError> {
        if amount.is_positive() {
            Ok(())
        } else {
            Err(BalanceError::NonPositiveAmount {
                asset: self.asset_name.clone(),
                amount,
            })
        }
    }
}
