//! Errors surfaced by the use cases.

use crate::application::ports::StoreError;
use crate::domain::balance::BalanceError;
use crate::domain::order_execution::{OrderError, OrderStatus};
use crate::domain::shared::{CustomerId, OrderId, Quantity, Symbol};

/// Every failure a caller of the engine can observe.
///
/// All variants except `Conflict` are terminal for the call and leave the
/// ledger untouched. `Conflict` means concurrent writers kept winning the
/// race until the retry budget ran out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Order parameters failed validation.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Query parameters failed validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Not enough usable balance to reserve.
    #[error("Insufficient {asset} balance. Required: {required}, Available: {available}")]
    InsufficientBalance {
        /// Asset being reserved.
        asset: Symbol,
        /// Amount requested.
        required: Quantity,
        /// Usable amount at the time of the check.
        available: Quantity,
    },

    /// No order with this id.
    #[error("Order not found with id: {order_id}")]
    OrderNotFound {
        /// Order ID.
        order_id: OrderId,
    },

    /// Customer holds no balance line for this asset.
    #[error("{asset_name} asset not found for customer {customer_id}")]
    AssetNotFound {
        /// Customer.
        customer_id: CustomerId,
        /// Asset name.
        asset_name: Symbol,
    },

    /// The order is not PENDING.
    #[error("Order {order_id} is {status}: {reason}")]
    InvalidOrderState {
        /// Order ID.
        order_id: OrderId,
        /// Current status.
        status: OrderStatus,
        /// Why the transition was refused.
        reason: String,
    },

    /// The caller may not perform this action.
    #[error("Customer {customer_id} is not allowed to {action}")]
    Forbidden {
        /// Calling customer.
        customer_id: CustomerId,
        /// What was attempted.
        action: String,
    },

    /// Optimistic concurrency retries exhausted.
    #[error("{operation} did not complete after {attempts} attempts due to concurrent updates")]
    Conflict {
        /// Operation name.
        operation: String,
        /// Attempts made.
        attempts: u32,
    },

    /// Stored balances are inconsistent with the order being settled.
    #[error("Ledger inconsistency: {0}")]
    Inconsistent(String),

    /// The ledger store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// True if the failure came from a lost optimistic-concurrency race.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }

    /// Attach the order id to a domain transition error.
    #[must_use]
    pub fn from_order_error(order_id: &OrderId, err: OrderError) -> Self {
        match err {
            OrderError::InvalidStateTransition { from, reason, .. } => Self::InvalidOrderState {
                order_id: order_id.clone(),
                status: from,
                reason,
            },
            other => Self::from(other),
        }
    }
}

impl From<OrderError> for LedgerError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidParameters { message, .. } => Self::InvalidOrder(message),
            OrderError::InvalidStateTransition { from, reason, .. } => Self::InvalidOrderState {
                order_id: OrderId::new(""),
                status: from,
                reason,
            },
            OrderError::NotFound { order_id } => Self::OrderNotFound {
                order_id: OrderId::new(order_id),
            },
        }
    }
}

impl From<BalanceError> for LedgerError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InsufficientBalance {
                asset,
                required,
                available,
            } => Self::InsufficientBalance {
                asset,
                required,
                available,
            },
            BalanceError::NonPositiveAmount { .. } => Self::InvalidOrder(err.to_string()),
            BalanceError::ReservationShortfall { .. }
            | BalanceError::InvariantViolation { .. }
            | BalanceError::Arithmetic(_) => Self::Inconsistent(err.to_string()),
        }
    }
}
