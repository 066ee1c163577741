//! Concurrent reservation tests.
//!
//! Many tasks race to reserve against one balance line; optimistic
//! concurrency must never let them reserve more than was usable.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use brokerage_engine::application::dto::CreateOrderDto;
use brokerage_engine::application::errors::LedgerError;
use brokerage_engine::application::ports::{LedgerStore, NoOpEventPublisher};
use brokerage_engine::application::services::{BalanceReservationEngine, ConflictRetryPolicy};
use brokerage_engine::application::use_cases::{CancelOrderUseCase, CreateOrderUseCase};
use brokerage_engine::domain::order_execution::OrderSide;
use brokerage_engine::domain::shared::{CustomerId, OrderId, Principal, Quantity, Symbol};
use brokerage_engine::infrastructure::persistence::InMemoryLedgerStore;

fn generous_retries() -> ConflictRetryPolicy {
    ConflictRetryPolicy::new(
        200,
        Duration::from_micros(50),
        Duration::from_millis(2),
        2.0,
        0.5,
    )
}

async fn setup(
    usable: Decimal,
) -> (
    Arc<BalanceReservationEngine<InMemoryLedgerStore>>,
    Arc<CreateOrderUseCase<InMemoryLedgerStore, NoOpEventPublisher>>,
) {
    let engine = Arc::new(BalanceReservationEngine::new(
        Arc::new(InMemoryLedgerStore::new()),
        generous_retries(),
        Symbol::new("TRY"),
    ));
    engine
        .settle_credit(&CustomerId::new("john"), &Symbol::new("TRY"), Quantity::new(usable))
        .await
        .unwrap();
    let create = Arc::new(CreateOrderUseCase::new(
        Arc::clone(&engine),
        Arc::new(NoOpEventPublisher),
    ));
    (engine, create)
}

fn buy(size: Decimal, price: Decimal) -> CreateOrderDto {
    CreateOrderDto {
        customer_id: "john".to_string(),
        asset_name: "AAPL".to_string(),
        side: OrderSide::Buy,
        size,
        price,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_overdraw() {
    let (engine, create) = setup(dec!(1000)).await;
    let principal = Principal::customer(CustomerId::new("john"));

    // 40 orders of 100 TRY each against 1000 usable: exactly 10 fit.
    let handles: Vec<_> = (0..40)
        .map(|_| {
            let create = Arc::clone(&create);
            let principal = principal.clone();
            tokio::spawn(async move { create.execute(&principal, buy(dec!(1), dec!(100))).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(LedgerError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 10);
    let line = engine
        .store()
        .get_balance(&CustomerId::new("john"), &Symbol::new("TRY"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.size().amount(), dec!(1000));
    assert_eq!(line.usable_size().amount(), Decimal::ZERO);
    assert_eq!(engine.store().order_count(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_create_and_cancel_conserve_balance() {
    let (engine, create) = setup(dec!(500)).await;
    let cancel = Arc::new(CancelOrderUseCase::new(
        Arc::clone(&engine),
        Arc::new(NoOpEventPublisher),
    ));
    let principal = Principal::customer(CustomerId::new("john"));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let create = Arc::clone(&create);
            let cancel = Arc::clone(&cancel);
            let principal = principal.clone();
            tokio::spawn(async move {
                let order = create.execute(&principal, buy(dec!(5), dec!(10))).await?;
                cancel.execute(&principal, &OrderId::new(order.id)).await?;
                Ok::<_, LedgerError>(())
            })
        })
        .collect();

    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) | Err(LedgerError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let line = engine
        .store()
        .get_balance(&CustomerId::new("john"), &Symbol::new("TRY"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.usable_size().amount(), dec!(500));
    assert_eq!(line.size().amount(), dec!(500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancels_release_once() {
    let (engine, create) = setup(dec!(1000)).await;
    let cancel = Arc::new(CancelOrderUseCase::new(
        Arc::clone(&engine),
        Arc::new(NoOpEventPublisher),
    ));
    let principal = Principal::customer(CustomerId::new("john"));
    let order = create.execute(&principal, buy(dec!(4), dec!(100))).await.unwrap();
    let id = OrderId::new(order.id);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cancel = Arc::clone(&cancel);
            let principal = principal.clone();
            let id = id.clone();
            tokio::spawn(async move { cancel.execute(&principal, &id).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InvalidOrderState { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 1);
    let line = engine
        .store()
        .get_balance(&CustomerId::new("john"), &Symbol::new("TRY"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.usable_size().amount(), dec!(1000));
}
