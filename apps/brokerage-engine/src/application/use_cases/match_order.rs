//! Match Order Use Case
//!
//! Operator-triggered settlement of a single PENDING order at its stated
//! price. There is no order book and no partial fill.

use std::sync::Arc;

use crate::application::dto::OrderDto;
use crate::application::errors::LedgerError;
use crate::application::ports::{EventPublisherPort, LedgerStore, LedgerTransaction};
use crate::application::services::{BalanceReservationEngine, retry_on_conflict};
use crate::domain::shared::{OrderId, Principal};
use crate::observability;

/// Use case for settling a PENDING order.
pub struct MatchOrderUseCase<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    balances: Arc<BalanceReservationEngine<S>>,
    event_publisher: Arc<E>,
}

impl<S, E> MatchOrderUseCase<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    /// Create a new `MatchOrderUseCase`.
    pub const fn new(balances: Arc<BalanceReservationEngine<S>>, event_publisher: Arc<E>) -> Self {
        Self {
            balances,
            event_publisher,
        }
    }

    /// Settle `order_id`.
    ///
    /// BUY: the base currency reservation is consumed and the asset credited.
    /// SELL: the asset reservation is consumed and `size * price` of the base
    /// currency credited.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is an admin
    /// - `OrderNotFound` if no such order exists
    /// - `InvalidOrderState` unless the order is PENDING
    /// - `Conflict` if concurrent writers exhaust the retry budget
    pub async fn execute(
        &self,
        principal: &Principal,
        order_id: &OrderId,
    ) -> Result<OrderDto, LedgerError> {
        if !principal.is_admin() {
            return Err(LedgerError::Forbidden {
                customer_id: principal.customer_id().clone(),
                action: "match orders".to_string(),
            });
        }

        let balances = self.balances.as_ref();

        let mut order = retry_on_conflict(balances.retry_policy(), "match_order", move || async move {
            // 1. Load order
            let mut order = balances
                .store()
                .get_order(order_id)
                .await?
                .ok_or_else(|| LedgerError::OrderNotFound {
                    order_id: order_id.clone(),
                })?;

            // 2. Transition PENDING -> MATCHED
            let expected_version = order.version();
            order
                .mark_matched()
                .map_err(|e| LedgerError::from_order_error(order_id, e))?;

            // 3. Consume the reservation and credit the proceeds
            let settlement = order.settlement(balances.base_currency())?;
            let customer_id = order.customer_id();
            let debit = balances
                .stage_settle_debit(customer_id, &settlement.debit)
                .await?;
            let credit = balances
                .stage_settle_credit(customer_id, &settlement.credit)
                .await?;

            // 4. Save order and both balance lines in one transaction
            let transaction = LedgerTransaction::new()
                .with(debit)
                .with(credit)
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
            size = %order.size(),
            price = %order.price(),
            matched_by = %principal.customer_id(),
            "Order matched"
        );
        observability::record_order_matched(order.side().as_label());

        // 5. Publish events
        let events = order.drain_events();
        if let Err(e) = self.event_publisher.publish_order_events(events).await {
            tracing::error!("Failed to publish match events: {}", e);
        }

        Ok(OrderDto::from(&order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::CreateOrderDto;
    use crate::application::use_cases::test_support::{
        Engine, admin, balance, engine, fund, john, publisher,
    };
    use crate::application::use_cases::{CancelOrderUseCase, CreateOrderUseCase};
    use crate::domain::order_execution::{OrderSide, OrderStatus};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn place(engine: &Arc<Engine>, side: OrderSide, size: Decimal, price: Decimal) -> OrderId {
        let create = CreateOrderUseCase::new(Arc::clone(engine), publisher());
        let dto = create
            .execute(
                &john(),
                CreateOrderDto {
                    customer_id: "john".to_string(),
                    asset_name: "AAPL".to_string(),
                    side,
                    size,
                    price,
                },
            )
            .await
            .unwrap();
        OrderId::new(dto.id)
    }

    #[tokio::test]
    async fn buy_settlement_consumes_base_and_credits_new_asset_line() {
        let engine = engine();
        fund(&engine, "john", "TRY", 1000).await;
        let order_id = place(&engine, OrderSide::Buy, dec!(10), dec!(50)).await;

        let matcher = MatchOrderUseCase::new(Arc::clone(&engine), publisher());
        let dto = matcher.execute(&admin(), &order_id).await.unwrap();
        assert_eq!(dto.status, OrderStatus::Matched);

        assert_eq!(balance(&engine, "john", "TRY").await, (dec!(500), dec!(500)));
        assert_eq!(balance(&engine, "john", "AAPL").await, (dec!(10), dec!(10)));
    }

    #[tokio::test]
    async fn sell_settlement_reduces_asset_and_credits_base() {
        let engine = engine();
        fund(&engine, "john", "AAPL", 5).await;
        fund(&engine, "john", "TRY", 100).await;
        let order_id = place(&engine, OrderSide::Sell, dec!(5), dec!(12.5)).await;

        let matcher = MatchOrderUseCase::new(Arc::clone(&engine), publisher());
        matcher.execute(&admin(), &order_id).await.unwrap();

        assert_eq!(balance(&engine, "john", "AAPL").await, (dec!(0), dec!(0)));
        assert_eq!(balance(&engine, "john", "TRY").await, (dec!(162.5), dec!(162.5)));
    }

    #[tokio::test]
    async fn sell_settlement_opens_base_line_when_absent() {
        let engine = engine();
        fund(&engine, "john", "AAPL", 5).await;
        let order_id = place(&engine, OrderSide::Sell, dec!(2), dec!(10)).await;

        let matcher = MatchOrderUseCase::new(Arc::clone(&engine), publisher());
        matcher.execute(&admin(), &order_id).await.unwrap();

        assert_eq!(balance(&engine, "john", "TRY").await, (dec!(20), dec!(20)));
        assert_eq!(balance(&engine, "john", "AAPL").await, (dec!(3), dec!(3)));
    }

    #[tokio::test]
    async fn second_match_is_invalid_state_and_changes_nothing() {
        let engine = engine();
        fund(&engine, "john", "TRY", 1000).await;
        let order_id = place(&engine, OrderSide::Buy, dec!(1), dec!(100)).await;
        let matcher = MatchOrderUseCase::new(Arc::clone(&engine), publisher());

        matcher.execute(&admin(), &order_id).await.unwrap();
        let after_first = balance(&engine, "john", "TRY").await;
        let err = matcher.execute(&admin(), &order_id).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOrderState { .. }));
        assert_eq!(balance(&engine, "john", "TRY").await, after_first);
    }

    #[tokio::test]
    async fn canceled_order_cannot_be_matched() {
        let engine = engine();
        fund(&engine, "john", "TRY", 1000).await;
        let order_id = place(&engine, OrderSide::Buy, dec!(1), dec!(100)).await;
        CancelOrderUseCase::new(Arc::clone(&engine), publisher())
            .execute(&john(), &order_id)
            .await
            .unwrap();

        let matcher = MatchOrderUseCase::new(Arc::clone(&engine), publisher());
        let err = matcher.execute(&admin(), &order_id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidOrderState {
                status: OrderStatus::Canceled,
                ..
            }
        ));
        assert_eq!(balance(&engine, "john", "TRY").await, (dec!(1000), dec!(1000)));
    }

    #[tokio::test]
    async fn non_admin_cannot_match() {
        let engine = engine();
        fund(&engine, "john", "TRY", 1000).await;
        let order_id = place(&engine, OrderSide::Buy, dec!(1), dec!(100)).await;
        let matcher = MatchOrderUseCase::new(Arc::clone(&engine), publisher());
        let err = matcher.execute(&john(), &order_id).await.unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden { .. }));
    }
}
