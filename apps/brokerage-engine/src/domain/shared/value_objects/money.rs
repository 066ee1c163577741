//! Money value object for unit prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// A unit price expressed in the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero money.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Money value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this amount is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Validate a price for order placement.
    ///
    /// # Errors
    ///
    /// Returns error if the price is zero or negative.
    pub fn validate_for_order(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::InvalidValue {
                field: "price".to_string(),
                message: "Order price must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn validate_for_order() {
        assert!(Money::new(dec!(50)).validate_for_order().is_ok());
        assert!(Money::ZERO.validate_for_order().is_err());
        assert!(Money::new(dec!(-1)).validate_for_order().is_err());
    }

    #[test]
    fn serde_accepts_string_and_number() {
        let a: Money = serde_json::from_str("\"12.50\"").unwrap();
        let b: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(a, b);
    }
}
