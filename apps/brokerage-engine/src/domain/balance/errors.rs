//! Balance errors.

use std::fmt;

use crate::domain::shared::{DomainError, Quantity, Symbol};

/// Errors raised by balance mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// Amount is zero or negative where a positive amount is required.
    NonPositiveAmount {
        /// Asset the amount was for.
        asset: Symbol,
        /// The rejected amount.
        amount: Quantity,
    },

    /// Not enough usable balance to cover a reservation.
    InsufficientBalance {
        /// Asset being reserved.
        asset: Symbol,
        /// Amount requested.
        required: Quantity,
        /// Usable amount at the time of the check.
        available: Quantity,
    },

    /// A settlement tried to consume more than is currently reserved.
    ReservationShortfall {
        /// Asset being settled.
        asset: Symbol,
        /// Amount the settlement needs.
        required: Quantity,
        /// Amount currently reserved (`size - usable_size`).
        reserved: Quantity,
    },

    /// Stored state breaks `0 <= usable_size <= size`.
    InvariantViolation {
        /// Asset line.
        asset: Symbol,
        /// Current size.
        size: Quantity,
        /// Current usable size.
        usable_size: Quantity,
    },

    /// Decimal arithmetic overflowed.
    Arithmetic(DomainError),
}

impl fmt::Display for BalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount { asset, amount } => {
                write!(f, "Amount for {asset} must be positive, got {amount}")
            }
            Self::InsufficientBalance {
                asset,
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient {asset} balance. Required: {required}, Available: {available}"
                )
            }
            Self::ReservationShortfall {
                asset,
                required,
                reserved,
            } => {
                write!(
                    f,
                    "Cannot settle {required} {asset}: only {reserved} is reserved"
                )
            }
            Self::InvariantViolation {
                asset,
                size,
                usable_size,
            } => {
                write!(
                    f,
                    "Balance invariant violated for {asset}: size={size}, usable_size={usable_size}"
                )
            }
            Self::Arithmetic(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BalanceError {}

impl From<DomainError> for BalanceError {
    fn from(e: DomainError) -> Self {
        Self::Arithmetic(e)
    }
}
