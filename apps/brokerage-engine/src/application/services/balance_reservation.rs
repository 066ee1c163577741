//! Balance Reservation Engine
//!
//! Applies reserve, release and settle movements to balance lines. Each
//! movement comes in two forms:
//!
//! - `stage_*` reads the current line, applies the movement in memory and
//!   returns the conditional write, so a use case can commit it in the same
//!   transaction as an order transition.
//! - The plain form (`reserve`, `release`, ...) stages and commits a single
//!   line on its own, retrying on conflict.

use std::sync::Arc;

use crate::application::errors::LedgerError;
use crate::application::ports::{LedgerStore, LedgerTransaction, LedgerWrite};
use crate::application::services::conflict_retry::{ConflictRetryPolicy, retry_on_conflict};
use crate::domain::balance::{Asset, BalanceLookup};
use crate::domain::order_execution::BalanceLeg;
use crate::domain::shared::{CustomerId, Quantity, Symbol};

/// Validates and applies balance movements against the ledger store.
pub struct BalanceReservationEngine<S>
where
    S: LedgerStore,
{
    store: Arc<S>,
    retry_policy: ConflictRetryPolicy,
    base_currency: Symbol,
}

impl<S> BalanceReservationEngine<S>
where
    S: LedgerStore,
{
    /// Create a new `BalanceReservationEngine`.
    pub const fn new(store: Arc<S>, retry_policy: ConflictRetryPolicy, base_currency: Symbol) -> Self {
        Self {
            store,
            retry_policy,
            base_currency,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Retry policy shared with the use cases.
    pub const fn retry_policy(&self) -> &ConflictRetryPolicy {
        &self.retry_policy
    }

    /// The currency orders are priced in.
    pub const fn base_currency(&self) -> &Symbol {
        &self.base_currency
    }

    // ========================================================================
    // Staged movements
    // ========================================================================

    /// Stage a reservation of `leg.amount` from the usable balance.
    ///
    /// # Errors
    ///
    /// `AssetNotFound` if the line does not exist, `InsufficientBalance` if
    /// usable balance is short.
    pub async fn stage_reserve(
        &self,
        customer_id: &CustomerId,
        leg: &BalanceLeg,
    ) -> Result<LedgerWrite, LedgerError> {
        let mut asset = self.load_existing(customer_id, &leg.asset_name).await?;
        let expected_version = asset.version();
        asset.reserve(leg.amount)?;
        Ok(LedgerWrite::Balance {
            asset,
            expected_version: Some(expected_version),
        })
    }

    /// Stage a release of `leg.amount` back to the usable balance.
    ///
    /// # Errors
    ///
    /// `AssetNotFound` if the line does not exist.
    pub async fn stage_release(
        &self,
        customer_id: &CustomerId,
        leg: &BalanceLeg,
    ) -> Result<LedgerWrite, LedgerError> {
        let mut asset = self.load_existing(customer_id, &leg.asset_name).await?;
        let expected_version = asset.version();
        asset.release(leg.amount)?;
        Ok(LedgerWrite::Balance {
            asset,
            expected_version: Some(expected_version),
        })
    }

    /// Stage a credit, opening the line if the customer never held it.
    ///
    /// # Errors
    ///
    /// Returns error on store failure or a non-positive amount.
    pub async fn stage_settle_credit(
        &self,
        customer_id: &CustomerId,
        leg: &BalanceLeg,
    ) -> Result<LedgerWrite, LedgerError> {
        let lookup = BalanceLookup::from(
            self.store
                .get_balance(customer_id, &leg.asset_name)
                .await?,
        );
        let expected_version = lookup.expected_version();
        let asset = lookup.settle_credit(customer_id, &leg.asset_name, leg.amount)?;
        Ok(LedgerWrite::Balance {
            asset,
            expected_version,
        })
    }

    /// Stage consumption of an amount reserved at order placement.
    ///
    /// # Errors
    ///
    /// `AssetNotFound` if the line does not exist, `Inconsistent` if less
    /// than `leg.amount` is reserved.
    pub async fn stage_settle_debit(
        &self,
        customer_id: &CustomerId,
        leg: &BalanceLeg,
    ) -> Result<LedgerWrite, LedgerError> {
        let mut asset = self.load_existing(customer_id, &leg.asset_name).await?;
        let expected_version = asset.version();
        asset.settle_debit(leg.amount)?;
        Ok(LedgerWrite::Balance {
            asset,
            expected_version: Some(expected_version),
        })
    }

    // ========================================================================
    // Standalone movements
    // ========================================================================

    /// Reserve `amount` of `asset_name` for `customer_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::stage_reserve`]; `Conflict` if retries are exhausted.
    pub async fn reserve(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
        amount: Quantity,
    ) -> Result<(), LedgerError> {
        let leg = BalanceLeg {
            asset_name: asset_name.clone(),
            amount,
        };
        let leg = &leg;
        retry_on_conflict(&self.retry_policy, "reserve", move || async move {
            let write = self.stage_reserve(customer_id, leg).await?;
            self.commit_single(write).await
        })
        .await
    }

    /// Release `amount` of `asset_name` for `customer_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::stage_release`]; `Conflict` if retries are exhausted.
    pub async fn release(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
        amount: Quantity,
    ) -> Result<(), LedgerError> {
        let leg = BalanceLeg {
            asset_name: asset_name.clone(),
            amount,
        };
        let leg = &leg;
        retry_on_conflict(&self.retry_policy, "release", move || async move {
            let write = self.stage_release(customer_id, leg).await?;
            self.commit_single(write).await
        })
        .await
    }

    /// Credit `amount` of `asset_name` to `customer_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::stage_settle_credit`]; `Conflict` if retries are exhausted.
    pub async fn settle_credit(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
        amount: Quantity,
    ) -> Result<(), LedgerError> {
        let leg = BalanceLeg {
            asset_name: asset_name.clone(),
            amount,
        };
        let leg = &leg;
        retry_on_conflict(&self.retry_policy, "settle_credit", move || async move {
            let write = self.stage_settle_credit(customer_id, leg).await?;
            self.commit_single(write).await
        })
        .await
    }

    /// Consume `amount` of an existing reservation on `asset_name`.
    ///
    /// # Errors
    ///
    /// See [`Self::stage_settle_debit`]; `Conflict` if retries are exhausted.
    pub async fn settle_debit(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
        amount: Quantity,
    ) -> Result<(), LedgerError> {
        let leg = BalanceLeg {
            asset_name: asset_name.clone(),
            amount,
        };
        let leg = &leg;
        retry_on_conflict(&self.retry_policy, "settle_debit", move || async move {
            let write = self.stage_settle_debit(customer_id, leg).await?;
            self.commit_single(write).await
        })
        .await
    }

    async fn load_existing(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
    ) -> Result<Asset, LedgerError> {
        self.store
            .get_balance(customer_id, asset_name)
            .await?
            .ok_or_else(|| LedgerError::AssetNotFound {
                customer_id: customer_id.clone(),
                asset_name: asset_name.clone(),
            })
    }

    async fn commit_single(&self, write: LedgerWrite) -> Result<(), LedgerError> {
        self.store
            .commit(LedgerTransaction::new().with(write))
            .await
            .map_err(LedgerError::from)
    }
}
