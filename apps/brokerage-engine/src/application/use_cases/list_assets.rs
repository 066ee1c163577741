//! List Assets Use Case

use std::sync::Arc;

use crate::application::dto::AssetDto;
use crate::application::errors::LedgerError;
use crate::application::ports::LedgerStore;
use crate::domain::shared::{CustomerId, Principal};

/// Use case for listing a customer's balance lines.
pub struct ListAssetsUseCase<S>
where
    S: LedgerStore,
{
    store: Arc<S>,
}

impl<S> ListAssetsUseCase<S>
where
    S: LedgerStore,
{
    /// Create a new `ListAssetsUseCase`.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Balance lines of `customer_id`, ordered by asset name.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the caller may not act for that customer.
    pub async fn execute(
        &self,
        principal: &Principal,
        customer_id: &CustomerId,
    ) -> Result<Vec<AssetDto>, LedgerError> {
        if !principal.can_act_for(customer_id) {
            return Err(LedgerError::Forbidden {
                customer_id: principal.customer_id().clone(),
                action: format!("list assets of {customer_id}"),
            });
        }

        let assets = self.store.list_balances(customer_id).await?;
        Ok(assets.iter().map(AssetDto::from).collect())
    }
}
