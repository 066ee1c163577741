//! Quantity value object for balances and order sizes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::Money;
use crate::domain::shared::DomainError;

/// An exact decimal amount of some asset.
///
/// Used for order sizes and for balance lines alike: a `TRY` balance of
/// `1000` and an `AAPL` holding of `5` are both quantities of their symbol.
/// Arithmetic is checked; balances never silently wrap or lose precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Zero quantity.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Quantity from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Quantity from an integer.
    #[must_use]
    pub fn from_i64(amount: i64) -> Self {
        Self(Decimal::new(amount, 0))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this quantity is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this quantity is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this quantity is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Validate an order size.
    ///
    /// # Errors
    ///
    /// Returns error if the size is zero or negative.
    pub fn validate_for_order(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "size".to_string(),
                message: "Order size must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the sum is not representable.
    pub fn checked_add(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::ArithmeticOverflow {
                operation: format!("{self} + {rhs}"),
            })
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the difference is not representable.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::ArithmeticOverflow {
                operation: format!("{self} - {rhs}"),
            })
    }

    /// Value of this quantity at a unit price, in base currency units.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if `size * price` is not representable.
    pub fn notional(self, price: Money) -> Result<Self, DomainError> {
        self.0
            .checked_mul(price.amount())
            .map(Self)
            .ok_or_else(|| DomainError::ArithmeticOverflow {
                operation: format!("{self} * {price}"),
            })
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}
