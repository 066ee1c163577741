//! In-memory ledger store.
//!
//! All rows live behind one lock, so a `commit` checks every expected
//! version and applies every write while no other writer can interleave.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{LedgerStore, LedgerTransaction, LedgerWrite, StoreError};
use crate::domain::balance::Asset;
use crate::domain::order_execution::Order;
use crate::domain::shared::{CustomerId, OrderId, Symbol, Timestamp};

type BalanceKey = (CustomerId, Symbol);

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<BalanceKey, Asset>,
    orders: HashMap<OrderId, Order>,
}

/// In-memory implementation of `LedgerStore`.
///
/// Suitable for tests, demos and single-process deployments. State is lost
/// on restart.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .len()
    }

    /// Number of stored balance lines.
    #[must_use]
    pub fn balance_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .balances
            .len()
    }

    fn check(state: &LedgerState, write: &LedgerWrite) -> Result<(), StoreError> {
        match write {
            LedgerWrite::Balance {
                asset,
                expected_version,
            } => {
                let key = (asset.customer_id().clone(), asset.asset_name().clone());
                let stored = state.balances.get(&key).map(Asset::version);
                if stored == *expected_version {
                    Ok(())
                } else {
                    Err(StoreError::Conflict {
                        entity: "asset",
                        key: format!("{}/{}", key.0, key.1),
                    })
                }
            }
            LedgerWrite::Order {
                order,
                expected_version,
            } => {
                let stored = state.orders.get(order.id()).map(Order::version);
                if stored == *expected_version {
                    Ok(())
                } else {
                    Err(StoreError::Conflict {
                        entity: "order",
                        key: order.id().to_string(),
                    })
                }
            }
        }
    }

    fn apply(state: &mut LedgerState, write: LedgerWrite) {
        match write {
            LedgerWrite::Balance {
                mut asset,
                expected_version,
            } => {
                asset.set_version(expected_version.map_or(1, |v| v + 1));
                let key = (asset.customer_id().clone(), asset.asset_name().clone());
                state.balances.insert(key, asset);
            }
            LedgerWrite::Order {
                mut order,
                expected_version,
            } => {
                order.set_version(expected_version.map_or(1, |v| v + 1));
                order.drain_events();
                state.orders.insert(order.id().clone(), order);
            }
        }
    }

    fn reject_duplicates(transaction: &LedgerTransaction) -> Result<(), StoreError> {
        let mut balances = HashSet::new();
        let mut orders = HashSet::new();
        for write in transaction.writes() {
            match write {
                LedgerWrite::Balance { asset, .. } => {
                    if !balances.insert((asset.customer_id(), asset.asset_name())) {
                        return Err(StoreError::DuplicateWrite {
                            entity: "asset",
                            key: format!("{}/{}", asset.customer_id(), asset.asset_name()),
                        });
                    }
                }
                LedgerWrite::Order { order, .. } => {
                    if !orders.insert(order.id()) {
                        return Err(StoreError::DuplicateWrite {
                            entity: "order",
                            key: order.id().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_balance(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
    ) -> Result<Option<Asset>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .balances
            .get(&(customer_id.clone(), asset_name.clone()))
            .cloned())
    }

    async fn list_balances(&self, customer_id: &CustomerId) -> Result<Vec<Asset>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut assets: Vec<Asset> = state
            .balances
            .values()
            .filter(|a| a.customer_id() == customer_id)
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.asset_name().cmp(b.asset_name()));
        Ok(assets)
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.orders.get(order_id).cloned())
    }

    async fn list_orders(
        &self,
        customer_id: &CustomerId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.customer_id() == customer_id && o.create_date().is_within(from, to))
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            a.create_date()
                .cmp(&b.create_date())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(orders)
    }

    async fn commit(&self, transaction: LedgerTransaction) -> Result<(), StoreError> {
        Self::reject_duplicates(&transaction)?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for write in transaction.writes() {
            Self::check(&state, write)?;
        }
        for write in transaction.into_writes() {
            Self::apply(&mut state, write);
        }
        Ok(())
    }
}
