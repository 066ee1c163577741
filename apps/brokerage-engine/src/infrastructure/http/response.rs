//! HTTP response DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::BrokerageError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// An error rendered as a JSON body with the mapped status.
#[derive(Debug, Clone)]
pub struct ApiError {
    error: BrokerageError,
    path: String,
}

impl ApiError {
    /// Attach the failing request path.
    #[must_use]
    pub fn new(error: BrokerageError, path: &str) -> Self {
        Self {
            error,
            path: path.to_string(),
        }
    }

    /// The underlying coded error.
    #[must_use]
    pub const fn error(&self) -> &BrokerageError {
        &self.error
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.code().http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.error.to_http_response(self.path))).into_response()
    }
}
