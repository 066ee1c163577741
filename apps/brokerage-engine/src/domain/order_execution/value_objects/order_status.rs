//! Order status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, funds reserved, awaiting match or cancel.
    Pending,
    /// Settled by an administrator.
    Matched,
    /// Canceled by its owner; reservation released.
    Canceled,
}

impl OrderStatus {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Matched | Self::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}
