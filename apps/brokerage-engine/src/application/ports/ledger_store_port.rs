//! Ledger Store Port (Driven Port)
//!
//! Durable storage for `Asset` and `Order` rows. Every row carries a
//! version; writes are conditional on the version the caller read, which
//! is what lets concurrent handlers reserve against one balance without
//! double spending.
//!
//! # Versions
//!
//! - A row that does not exist is written with `expected_version = None`.
//! - The first stored version is `1`; every successful write increments it.
//! - A write whose expectation does not match fails with `StoreError::Conflict`.
//!
//! `commit` applies a batch of such writes all-or-nothing. Order state
//! transitions and their balance movements always travel in one batch.

use async_trait::async_trait;

use crate::domain::balance::Asset;
use crate::domain::order_execution::Order;
use crate::domain::shared::{CustomerId, OrderId, Symbol, Timestamp};

/// Ledger store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A conditional write lost a race.
    #[error("Concurrent modification of {entity} {key}")]
    Conflict {
        /// Row kind ("asset" or "order").
        entity: &'static str,
        /// Row key.
        key: String,
    },

    /// A transaction wrote the same row twice.
    #[error("Transaction writes {entity} {key} more than once")]
    DuplicateWrite {
        /// Row kind.
        entity: &'static str,
        /// Row key.
        key: String,
    },

    /// Backend failure.
    #[error("Ledger store unavailable: {message}")]
    Unavailable {
        /// Details.
        message: String,
    },
}

/// One conditional write inside a `LedgerTransaction`.
#[derive(Debug, Clone)]
pub enum LedgerWrite {
    /// Insert or replace an asset line.
    Balance {
        /// New state.
        asset: Asset,
        /// Version read before mutation, `None` if the line did not exist.
        expected_version: Option<u64>,
    },
    /// Insert or replace an order.
    Order {
        /// New state.
        order: Order,
        /// Version read before mutation, `None` for a new order.
        expected_version: Option<u64>,
    },
}

/// An all-or-nothing batch of conditional writes.
#[derive(Debug, Clone, Default)]
pub struct LedgerTransaction {
    writes: Vec<LedgerWrite>,
}

impl LedgerTransaction {
    /// Empty transaction.
    #[must_use]
    pub const fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// Add a prepared write.
    #[must_use]
    pub fn with(mut self, write: LedgerWrite) -> Self {
        self.writes.push(write);
        self
    }

    /// Add a balance write.
    #[must_use]
    pub fn put_balance(self, asset: Asset, expected_version: Option<u64>) -> Self {
        self.with(LedgerWrite::Balance {
            asset,
            expected_version,
        })
    }

    /// Add an order insert.
    #[must_use]
    pub fn insert_order(self, order: Order) -> Self {
        self.with(LedgerWrite::Order {
            order,
            expected_version: None,
        })
    }

    /// Add an order update.
    #[must_use]
    pub fn update_order(self, order: Order, expected_version: u64) -> Self {
        self.with(LedgerWrite::Order {
            order,
            expected_version: Some(expected_version),
        })
    }

    /// The writes in submission order.
    #[must_use]
    pub fn writes(&self) -> &[LedgerWrite] {
        &self.writes
    }

    /// Consume into the writes.
    #[must_use]
    pub fn into_writes(self) -> Vec<LedgerWrite> {
        self.writes
    }

    /// True if there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Port for ledger persistence.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read one balance line.
    ///
    /// # Errors
    ///
    /// Returns error on backend failure.
    async fn get_balance(
        &self,
        customer_id: &CustomerId,
        asset_name: &Symbol,
    ) -> Result<Option<Asset>, StoreError>;

    /// All balance lines of a customer, ordered by asset name.
    ///
    /// # Errors
    ///
    /// Returns error on backend failure.
    async fn list_balances(&self, customer_id: &CustomerId) -> Result<Vec<Asset>, StoreError>;

    /// Read one order.
    ///
    /// # Errors
    ///
    /// Returns error on backend failure.
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders of a customer created within `[from, to]`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error on backend failure.
    async fn list_orders(
        &self,
        customer_id: &CustomerId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Order>, StoreError>;

    /// Apply every write or none of them.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if any expectation fails; nothing is written.
    async fn commit(&self, transaction: LedgerTransaction) -> Result<(), StoreError>;

    /// Conditionally write a single balance line.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the stored version differs from `expected_version`.
    async fn upsert_balance(
        &self,
        asset: Asset,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError> {
        self.commit(LedgerTransaction::new().put_balance(asset, expected_version))
            .await
    }

    /// Insert a new order and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if an order with the same id exists.
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        let order_id = order.id().clone();
        self.commit(LedgerTransaction::new().insert_order(order))
            .await?;
        self.get_order(&order_id)
            .await?
            .ok_or_else(|| StoreError::Unavailable {
                message: format!("order {order_id} missing after insert"),
            })
    }

    /// Conditionally replace an order.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the stored version differs from `expected_version`.
    async fn update_order(&self, order: Order, expected_version: u64) -> Result<(), StoreError> {
        self.commit(LedgerTransaction::new().update_order(order, expected_version))
            .await
    }
}
