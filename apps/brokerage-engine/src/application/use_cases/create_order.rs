//! Create Order Use Case

use std::sync::Arc;

use crate::application::dto::{CreateOrderDto, OrderDto};
use crate::application::errors::LedgerError;
use crate::application::ports::{EventPublisherPort, LedgerStore, LedgerTransaction};
use crate::application::services::{BalanceReservationEngine, retry_on_conflict};
use crate::domain::order_execution::Order;
use crate::domain::shared::Principal;
use crate::observability;

/// Use case for placing a PENDING order with its reservation.
pub struct CreateOrderUseCase<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    balances: Arc<BalanceReservationEngine<S>>,
    event_publisher: Arc<E>,
}

impl<S, E> CreateOrderUseCase<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    /// Create a new `CreateOrderUseCase`.
    pub const fn new(balances: Arc<BalanceReservationEngine<S>>, event_publisher: Arc<E>) -> Self {
        Self {
            balances,
            event_publisher,
        }
    }

    /// Place an order on behalf of `request.customer_id`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not act for that customer
    /// - `InvalidOrder` if size, price or asset are invalid
    /// - `AssetNotFound` / `InsufficientBalance` if the reservation fails
    /// - `Conflict` if concurrent writers exhaust the retry budget
    pub async fn execute(
        &self,
        principal: &Principal,
        request: CreateOrderDto,
    ) -> Result<OrderDto, LedgerError> {
        let command = request.to_command();

        // 1. Authorize
        if !principal.can_act_for(&command.customer_id) {
            return Err(LedgerError::Forbidden {
                customer_id: principal.customer_id().clone(),
                action: format!("place orders for {}", command.customer_id),
            });
        }

        // 2. Validate and build the order
        let base_currency = self.balances.base_currency();
        let mut order = Order::place(command, base_currency)?;
        let reservation = order.reservation(base_currency)?;

        // 3. Reserve funds and insert the order in one transaction
        let balances = self.balances.as_ref();
        let (order_ref, leg) = (&order, &reservation);
        retry_on_conflict(balances.retry_policy(), "create_order", move || async move {
            let reserve = balances
                .stage_reserve(order_ref.customer_id(), leg)
                .await?;
            let transaction = LedgerTransaction::new()
                .with(reserve)
                .insert_order(order_ref.clone());
            balances.store().commit(transaction).await?;
            Ok(())
        })
        .await
        .inspect_err(|e| {
            tracing::info!(
                customer_id = %order.customer_id(),
                asset = %order.asset_name(),
                side = %order.side(),
                error = %e,
                "Order rejected"
            );
        })?;

        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            asset = %order.asset_name(),
            side = %order.side(),
            size = %order.size(),
            price = %order.price(),
            reserved_asset = %reservation.asset_name,
            reserved = %reservation.amount,
            "Order created"
        );
        observability::record_order_created(order.side().as_label());

        // 4. Publish events
        let events = order.drain_events();
        if let Err(e) = self.event_publisher.publish_order_events(events).await {
            tracing::error!("Failed to publish order created events: {}", e);
        }

        Ok(OrderDto::from(&order))
    }
}
