//! Cancel Order Use Case

use std::sync::Arc;

use crate::application::dto::OrderDto;
use crate::application::errors::LedgerError;
use crate::application::ports::{EventPublisherPort, LedgerStore, LedgerTransaction};
use crate::application::services::{BalanceReservationEngine, retry_on_conflict};
use crate::domain::shared::{OrderId, Principal};
use crate::observability;

/// Use case for canceling a PENDING order and releasing its reservation.
pub struct CancelOrderUseCase<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    balances: Arc<BalanceReservationEngine<S>>,
    event_publisher: Arc<E>,
}

impl<S, E> CancelOrderUseCase<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    /// Create a new `CancelOrderUseCase`.
    pub const fn new(balances: Arc<BalanceReservationEngine<S>>, event_publisher: Arc<E>) -> Self {
        Self {
            balances,
            event_publisher,
        }
    }

    /// Cancel `order_id` as `principal`.
    ///
    /// Only the owner may cancel; admin status does not widen this.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if no such order exists
    /// - `Forbidden` if the caller does not own the order
    /// - `InvalidOrderState` unless the order is PENDING
    /// - `Conflict` if concurrent writers exhaust the retry budget
    pub async fn execute(
        &self,
        principal: &Principal,
        order_id: &OrderId,
    ) -> Result<OrderDto, LedgerError> {
        let balances = self.balances.as_ref();

        let mut order = retry_on_conflict(balances.retry_policy(), "cancel_order", move || async move {
            // 1. Load order
            let mut order = balances
                .store()
                .get_order(order_id)
                .await?
                .ok_or_else(|| LedgerError::OrderNotFound {
                    order_id: order_id.clone(),
                })?;

            // 2. Check ownership
            if order.customer_id() != principal.customer_id() {
                return Err(LedgerError::Forbidden {
                    customer_id: principal.customer_id().clone(),
                    action: format!("cancel order {order_id}"),
                });
            }

            // 3. Transition PENDING -> CANCELED
            let expected_version = order.version();
            order
                .cancel()
                .map_err(|e| LedgerError::from_order_error(order_id, e))?;

            // 4. Release the reservation and save in one transaction
            let leg = order.reservation(balances.base_currency())?;
            let release = balances.stage_release(order.customer_id(), &leg).await?;
            let transaction = LedgerTransaction::new()
                .with(release)
                .update_order(order.clone(), expected_version);
            balances.store().commit(transaction).await?;

            Ok(order)
        })
        .await?;

        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            asset = %order.asset_name(),
            side = %order.side(),
            "Order canceled"
        );
        observability::record_order_canceled(order.side().as_label());

        // 5. Publish events
        let events = order.drain_events();
        if let Err(e) = self.event_publisher.publish_order_events(events).await {
            tracing::error!("Failed to publish cancel events: {}", e);
        }

        Ok(OrderDto::from(&order))
    }
}
