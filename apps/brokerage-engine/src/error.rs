//! Stable error codes for the brokerage engine's outer surfaces.
//!
//! Every [`LedgerError`] maps to one [`ErrorCode`], which fixes the wire
//! reason string and the HTTP status clients see.
//!
//! # HTTP Status Codes
//!
//! | Code | Status | Usage |
//! |------|--------|-------|
//! | `ORDER_001` | 400 | Insufficient usable balance |
//! | `ORDER_002` | 400 | Invalid order parameters |
//! | `ORDER_003` | 404 | Order not found |
//! | `ORDER_004` | 409 | Order is not PENDING |
//! | `ASSET_001` | 404 | Asset line not found |
//! | `AUTH_001` | 401 | Missing or malformed identity |
//! | `AUTH_002` | 403 | Caller may not act on this resource |
//! | `REQUEST_001` | 400 | Malformed request |
//! | `LEDGER_001` | 409 | Concurrent updates exhausted retries |
//! | `LEDGER_002` | 500 | Store failure or ledger inconsistency |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::application::errors::LedgerError;
use crate::application::ports::StoreError;
use crate::domain::shared::Timestamp;

/// Error codes for the brokerage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Order errors
    /// Not enough usable balance to reserve.
    InsufficientFunds,
    /// Order parameters failed validation.
    InvalidOrder,
    /// Order not found.
    OrderNotFound,
    /// Order already left PENDING.
    InvalidOrderState,

    // Asset errors
    /// Customer holds no line for the asset.
    AssetNotFound,

    // Auth errors
    /// No usable principal on the request.
    Unauthorized,
    /// Principal may not act on the resource.
    Forbidden,

    // Request errors
    /// Malformed query or body.
    InvalidRequest,

    // Ledger errors
    /// Optimistic concurrency retries exhausted.
    Conflict,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InsufficientFunds | Self::InvalidOrder | Self::InvalidRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::OrderNotFound | Self::AssetNotFound => 404,
            Self::InvalidOrderState | Self::Conflict => 409,
            Self::InternalError => 500,
        }
    }

    /// Stable reason string carried in response bodies.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InsufficientFunds => "ORDER_001",
            Self::InvalidOrder => "ORDER_002",
            Self::OrderNotFound => "ORDER_003",
            Self::InvalidOrderState => "ORDER_004",
            Self::AssetNotFound => "ASSET_001",
            Self::Unauthorized => "AUTH_001",
            Self::Forbidden => "AUTH_002",
            Self::InvalidRequest => "REQUEST_001",
            Self::Conflict => "LEDGER_001",
            Self::InternalError => "LEDGER_002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// A coded error with key/value context, ready to render.
#[derive(Debug, Clone)]
pub struct BrokerageError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl BrokerageError {
    /// Create a new error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key/value.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Context pairs in insertion order.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Missing or malformed identity headers.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Malformed request.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Render the response body for a request path.
    #[must_use]
    pub fn to_http_response(&self, path: impl Into<String>) -> HttpErrorResponse {
        HttpErrorResponse {
            code: self.code.reason().to_string(),
            message: self.message.clone(),
            details: self.context.iter().cloned().collect(),
            timestamp: Timestamp::now(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for BrokerageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

impl std::error::Error for BrokerageError {}

impl From<&LedgerError> for BrokerageError {
    fn from(err: &LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidOrder(_) => Self::new(ErrorCode::InvalidOrder, message),
            LedgerError::InvalidRequest(_) => Self::new(ErrorCode::InvalidRequest, message),
            LedgerError::InsufficientBalance {
                asset,
                required,
                available,
            } => Self::new(ErrorCode::InsufficientFunds, message)
                .with_context("asset_name", asset.as_str())
                .with_context("required", required.to_string())
                .with_context("available", available.to_string()),
            LedgerError::OrderNotFound { order_id } => {
                Self::new(ErrorCode::OrderNotFound, message).with_context("order_id", order_id.as_str())
            }
            LedgerError::AssetNotFound {
                customer_id,
                asset_name,
            } => Self::new(ErrorCode::AssetNotFound, message)
                .with_context("customer_id", customer_id.as_str())
                .with_context("asset_name", asset_name.as_str()),
            LedgerError::InvalidOrderState {
                order_id, status, ..
            } => Self::new(ErrorCode::InvalidOrderState, message)
                .with_context("order_id", order_id.as_str())
                .with_context("status", status.to_string()),
            LedgerError::Forbidden { customer_id, .. } => {
                Self::new(ErrorCode::Forbidden, message).with_context("customer_id", customer_id.as_str())
            }
            LedgerError::Conflict { operation, attempts } => Self::new(ErrorCode::Conflict, message)
                .with_context("operation", operation.clone())
                .with_context("attempts", attempts.to_string()),
            LedgerError::Store(StoreError::Conflict { entity, key }) => {
                Self::new(ErrorCode::Conflict, message)
                    .with_context("entity", *entity)
                    .with_context("key", key.clone())
            }
            LedgerError::Inconsistent(_) | LedgerError::Store(_) => {
                Self::new(ErrorCode::InternalError, message)
            }
        }
    }
}

impl From<LedgerError> for BrokerageError {
    fn from(err: LedgerError) -> Self {
        Self::from(&err)
    }
}

/// HTTP error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    pub details: HashMap<String, String>,
    /// When the error was produced.
    pub timestamp: Timestamp,
    /// Request path that failed.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::OrderStatus;
    use crate::domain::shared::{CustomerId, OrderId, Quantity, Symbol};

    #[test]
    fn test_error_code_http_mapping() {
        assert_eq!(ErrorCode::InsufficientFunds.http_status(), 400);
        assert_eq!(ErrorCode::InvalidOrder.http_status(), 400);
        assert_eq!(ErrorCode::Unauthorized.http_status(), 401);
        assert_eq!(ErrorCode::Forbidden.http_status(), 403);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), 404);
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }

    #[test]
    fn test_insufficient_balance_context() {
        let err = BrokerageError::from(LedgerError::InsufficientBalance {
            asset: Symbol::new("TRY"),
            required: Quantity::from_i64(600),
            available: Quantity::from_i64(500),
        });

        assert_eq!(err.code(), ErrorCode::InsufficientFunds);
        let body = err.to_http_response("/api/v1/orders");
        assert_eq!(body.code, "ORDER_001");
        assert_eq!(body.details.get("required").map(String::as_str), Some("600"));
        assert_eq!(body.details.get("available").map(String::as_str), Some("500"));
        assert_eq!(body.path, "/api/v1/orders");
    }

    #[test]
    fn test_order_state_maps_to_conflict_status() {
        let err = BrokerageError::from(LedgerError::InvalidOrderState {
            order_id: OrderId::new("ord-1"),
            status: OrderStatus::Canceled,
            reason: "already canceled".to_string(),
        });
        assert_eq!(err.code().http_status(), 409);
        assert_eq!(err.code().reason(), "ORDER_004");
    }

    #[test]
    fn test_forbidden_and_not_found() {
        let forbidden = BrokerageError::from(LedgerError::Forbidden {
            customer_id: CustomerId::new("jane"),
            action: "cancel this order".to_string(),
        });
        assert_eq!(forbidden.code(), ErrorCode::Forbidden);

        let missing = BrokerageError::from(LedgerError::AssetNotFound {
            customer_id: CustomerId::new("john"),
            asset_name: Symbol::new("TRY"),
        });
        assert_eq!(missing.code().http_status(), 404);
    }

    #[test]
    fn test_store_failures_are_internal() {
        let err = BrokerageError::from(LedgerError::Store(StoreError::Unavailable {
            message: "lock poisoned".to_string(),
        }));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_display_includes_reason() {
        let err = BrokerageError::invalid_request("start_date must precede end_date");
        assert_eq!(err.to_string(), "[REQUEST_001] start_date must precede end_date");
    }
}
