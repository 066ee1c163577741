//! HTTP request DTOs and the caller identity extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::dto::CreateOrderDto;
use crate::domain::order_execution::OrderSide;
use crate::domain::shared::{CustomerId, Principal, Timestamp};
use crate::error::BrokerageError;

use super::response::ApiError;

/// Header carrying the authenticated customer id.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// Header carrying the admin capability (`true` / `false`).
pub const CUSTOMER_ADMIN_HEADER: &str = "x-customer-admin";

/// Request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer to place the order for. Defaults to the caller.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Asset to trade.
    pub asset_name: String,
    /// Side.
    pub side: OrderSide,
    /// Size.
    pub size: Decimal,
    /// Unit price in the base currency.
    pub price: Decimal,
}

impl CreateOrderRequest {
    /// Resolve the target customer and build the use case DTO.
    #[must_use]
    pub fn into_dto(self, caller: &Principal) -> CreateOrderDto {
        CreateOrderDto {
            customer_id: self
                .customer_id
                .unwrap_or_else(|| caller.customer_id().to_string()),
            asset_name: self.asset_name,
            side: self.side,
            size: self.size,
            price: self.price,
        }
    }
}

/// Query string for `GET /api/v1/assets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAssetsParams {
    /// Customer whose balances to list. Defaults to the caller.
    pub customer_id: Option<String>,
}

/// Query string for `GET /api/v1/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersParams {
    /// Customer whose orders to list. Defaults to the caller.
    pub customer_id: Option<String>,
    /// Earliest creation time, inclusive. Defaults to the beginning of time.
    pub start_date: Option<String>,
    /// Latest creation time, inclusive. Defaults to now.
    pub end_date: Option<String>,
}

impl ListOrdersParams {
    /// Parsed `(from, to)` window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if a date does not parse.
    pub fn window(&self) -> Result<(Timestamp, Timestamp), BrokerageError> {
        let from = match self.start_date.as_deref() {
            Some(raw) => parse_timestamp("start_date", raw, WindowEdge::Start)?,
            None => Timestamp::new(DateTime::<Utc>::MIN_UTC),
        };
        let to = match self.end_date.as_deref() {
            Some(raw) => parse_timestamp("end_date", raw, WindowEdge::End)?,
            None => Timestamp::now(),
        };
        Ok((from, to))
    }
}

/// Which end of an inclusive date window a bound sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEdge {
    /// A plain date means the first instant of that day.
    Start,
    /// A plain date means the last instant of that day.
    End,
}

/// Parse an RFC 3339 timestamp, a zone-less ISO date-time (read as UTC), or
/// a plain date. A plain date covers the whole UTC day, so `edge` picks
/// its first or last nanosecond.
///
/// # Errors
///
/// Returns `InvalidRequest` naming the field if no format matches.
pub fn parse_timestamp(
    field: &str,
    raw: &str,
    edge: WindowEdge,
) -> Result<Timestamp, BrokerageError> {
    let raw = raw.trim();
    if let Ok(ts) = Timestamp::parse(raw) {
        return Ok(ts);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Timestamp::new(naive.and_utc()));
    }
    if let Some(bound) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| match edge {
            WindowEdge::Start => d.and_hms_opt(0, 0, 0),
            WindowEdge::End => d.and_hms_nano_opt(23, 59, 59, 999_999_999),
        })
    {
        return Ok(Timestamp::new(bound.and_utc()));
    }
    Err(
        BrokerageError::invalid_request(format!("{field} is not an ISO-8601 date-time"))
            .with_context("field", field)
            .with_context("value", raw),
    )
}

/// The authenticated caller, read from gateway headers.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let reject = |message: &str| ApiError::new(BrokerageError::unauthorized(message), &path);

        let customer_id = parts
            .headers
            .get(CUSTOMER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| reject("Missing X-Customer-Id header"))?;

        let is_admin = match parts
            .headers
            .get(CUSTOMER_ADMIN_HEADER)
            .map(|v| v.to_str().map(str::trim))
        {
            None => false,
            Some(Ok(v)) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(Ok(v)) if v.eq_ignore_ascii_case("false") || v == "0" || v.is_empty() => false,
            Some(_) => return Err(reject("Malformed X-Customer-Admin header")),
        };

        let customer_id = CustomerId::new(customer_id);
        Ok(Self(if is_admin {
            Principal::admin(customer_id)
        } else {
            Principal::customer(customer_id)
        }))
    }
}
