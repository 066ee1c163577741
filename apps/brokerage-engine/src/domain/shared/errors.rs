//! Domain errors shared by the value objects.

use std::fmt;

/// Domain-level errors raised while constructing or combining value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Decimal arithmetic left the representable range.
    ArithmeticOverflow {
        /// Operation that overflowed (e.g. "size * price").
        operation: String,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::ArithmeticOverflow { operation } => {
                write!(f, "Arithmetic overflow computing {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
