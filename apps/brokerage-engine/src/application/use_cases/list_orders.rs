//! List Orders Use Case

use std::sync::Arc;

use crate::application::dto::{ListOrdersQuery, OrderDto};
use crate::application::errors::LedgerError;
use crate::application::ports::LedgerStore;
use crate::domain::shared::Principal;

/// Use case for listing a customer's orders within a creation-time range.
pub struct ListOrdersUseCase<S>
where
    S: LedgerStore,
{
    store: Arc<S>,
}

impl<S> ListOrdersUseCase<S>
where
    S: LedgerStore,
{
    /// Create a new `ListOrdersUseCase`.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Orders of `query.customer_id` created in `[query.from, query.to]`,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not act for that customer
    /// - `InvalidRequest` if `from` is after `to`
    pub async fn execute(
        &self,
        principal: &Principal,
        query: ListOrdersQuery,
    ) -> Result<Vec<OrderDto>, LedgerError> {
        if !principal.can_act_for(&query.customer_id) {
            return Err(LedgerError::Forbidden {
                customer_id: principal.customer_id().clone(),
                action: format!("list orders of {}", query.customer_id),
            });
        }
        if query.from > query.to {
            return Err(LedgerError::InvalidRequest(format!(
                "start date {} is after end date {}",
                query.from, query.to
            )));
        }

        let orders = self
            .store
            .list_orders(&query.customer_id, query.from, query.to)
            .await?;

        tracing::debug!(
            customer_id = %query.customer_id,
            count = orders.len(),
            "Listed orders"
        );

        Ok(orders.iter().map(OrderDto::from).collect())
    }
}
