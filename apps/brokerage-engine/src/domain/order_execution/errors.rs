//! Order lifecycle errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors that can occur in the order lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invalid order parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Order not found.
    NotFound {
        /// Order ID.
        order_id: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Invalid order state transition: {from} -> {to}: {reason}")
            }
            Self::NotFound { order_id } => {
                write!(f, "Order not found: {order_id}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Canceled,
            to: OrderStatus::Matched,
            reason: "Order is canceled".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("CANCELED"));
        assert!(msg.contains("MATCHED"));
    }

    #[test]
    fn invalid_parameters_display() {
        let err = OrderError::InvalidParameters {
            field: "price".to_string(),
            message: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("'price'"));
    }

    #[test]
    fn not_found_display() {
        let err = OrderError::NotFound {
            order_id: "ord-1".to_string(),
        };
        assert_eq!(err.to_string(), "Order not found: ord-1");
    }
}
