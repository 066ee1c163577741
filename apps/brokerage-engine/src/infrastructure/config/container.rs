//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components.

use std::sync::Arc;

use crate::application::errors::LedgerError;
use crate::application::ports::{EventPublisherPort, LedgerStore};
use crate::application::services::BalanceReservationEngine;
use crate::application::use_cases::{
    CancelOrderUseCase, CreateOrderUseCase, ListAssetsUseCase, ListOrdersUseCase,
    MatchOrderUseCase,
};
use crate::config::{Config, SeedConfig};
use crate::domain::shared::{CustomerId, Quantity, Symbol};
use crate::infrastructure::messaging::TracingEventPublisher;
use crate::infrastructure::persistence::InMemoryLedgerStore;

/// Dependency injection container.
///
/// Holds the ledger store, the reservation engine built on it, and the
/// event publisher. Use cases are created on demand and share all three.
pub struct Container<S, E>
where
    S: LedgerStore + 'static,
    E: EventPublisherPort + 'static,
{
    store: Arc<S>,
    balances: Arc<BalanceReservationEngine<S>>,
    event_publisher: Arc<E>,
}

impl Container<InMemoryLedgerStore, TracingEventPublisher> {
    /// Wire the in-memory ledger and tracing publisher from configuration.
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        let balances = Arc::new(BalanceReservationEngine::new(
            Arc::clone(&store),
            config.ledger.retry.to_policy(),
            Symbol::new(config.ledger.base_currency.as_str()),
        ));
        Self::new(store, balances, Arc::new(TracingEventPublisher::new()))
    }
}

impl<S, E> Container<S, E>
where
    S: LedgerStore + 'static,
    E: EventPublisherPort + 'static,
{
    /// Create a new container with all dependencies.
    pub const fn new(
        store: Arc<S>,
        balances: Arc<BalanceReservationEngine<S>>,
        event_publisher: Arc<E>,
    ) -> Self {
        Self {
            store,
            balances,
            event_publisher,
        }
    }

    /// Get the ledger store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Get the balance reservation engine.
    pub fn balances(&self) -> Arc<BalanceReservationEngine<S>> {
        Arc::clone(&self.balances)
    }

    /// Create a `CreateOrderUseCase`.
    pub fn create_order_use_case(&self) -> CreateOrderUseCase<S, E> {
        CreateOrderUseCase::new(Arc::clone(&self.balances), Arc::clone(&self.event_publisher))
    }

    /// Create a `CancelOrderUseCase`.
    pub fn cancel_order_use_case(&self) -> CancelOrderUseCase<S, E> {
        CancelOrderUseCase::new(Arc::clone(&self.balances), Arc::clone(&self.event_publisher))
    }

    /// Create a `MatchOrderUseCase`.
    pub fn match_order_use_case(&self) -> MatchOrderUseCase<S, E> {
        MatchOrderUseCase::new(Arc::clone(&self.balances), Arc::clone(&self.event_publisher))
    }

    /// Create a `ListOrdersUseCase`.
    pub fn list_orders_use_case(&self) -> ListOrdersUseCase<S> {
        ListOrdersUseCase::new(Arc::clone(&self.store))
    }

    /// Create a `ListAssetsUseCase`.
    pub fn list_assets_use_case(&self) -> ListAssetsUseCase<S> {
        ListAssetsUseCase::new(Arc::clone(&self.store))
    }

    /// Credit the configured opening balances.
    ///
    /// Goes through `settle_credit`, so seeded lines obey the same
    /// invariants as any other credit. Zero amounts are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first ledger error encountered.
    pub async fn seed_demo_data(&self, seed: &SeedConfig) -> Result<usize, LedgerError> {
        if !seed.enabled {
            return Ok(0);
        }

        let mut credited = 0;
        for customer in &seed.customers {
            let customer_id = CustomerId::new(customer.customer_id.as_str());
            for line in &customer.balances {
                if line.amount.is_zero() {
                    continue;
                }
                let asset_name = Symbol::new(line.asset_name.as_str());
                self.balances
                    .settle_credit(&customer_id, &asset_name, Quantity::new(line.amount))
                    .await?;
                credited += 1;
            }
        }

        tracing::info!(
            customers = seed.customers.len(),
            lines = credited,
            "Demo balances seeded"
        );

        Ok(credited)
    }
}
