//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases. The
//! caller identity comes from gateway headers (see [`Caller`]); every
//! authorization decision is left to the use cases.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::application::dto::ListOrdersQuery;
use crate::application::errors::LedgerError;
use crate::application::ports::{EventPublisherPort, LedgerStore};
use crate::application::use_cases::{
    CancelOrderUseCase, CreateOrderUseCase, ListAssetsUseCase, ListOrdersUseCase,
    MatchOrderUseCase,
};
use crate::domain::shared::{CustomerId, OrderId};
use crate::error::BrokerageError;
use crate::observability;

use super::request::{Caller, CreateOrderRequest, ListAssetsParams, ListOrdersParams};
use super::response::{ApiError, HealthResponse};

/// Application state shared across handlers.
pub struct AppState<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    /// Use case for placing orders.
    pub create_order: Arc<CreateOrderUseCase<S, E>>,
    /// Use case for canceling orders.
    pub cancel_order: Arc<CancelOrderUseCase<S, E>>,
    /// Use case for settling orders.
    pub match_order: Arc<MatchOrderUseCase<S, E>>,
    /// Order history queries.
    pub list_orders: Arc<ListOrdersUseCase<S>>,
    /// Balance queries.
    pub list_assets: Arc<ListAssetsUseCase<S>>,
    /// Application version.
    pub version: String,
}

impl<S, E> Clone for AppState<S, E>
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    fn clone(&self) -> Self {
        Self {
            create_order: Arc::clone(&self.create_order),
            cancel_order: Arc::clone(&self.cancel_order),
            match_order: Arc::clone(&self.match_order),
            list_orders: Arc::clone(&self.list_orders),
            list_assets: Arc::clone(&self.list_assets),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<S, E>(state: AppState<S, E>) -> Router
where
    S: LedgerStore + 'static,
    E: EventPublisherPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/assets", get(list_assets))
        .route("/api/v1/orders", post(create_order).get(list_orders))
        .route("/api/v1/orders/{order_id}", delete(cancel_order))
        .route("/api/v1/orders/{order_id}/match", post(match_order))
        .with_state(state)
}

/// Render a use case outcome, recording request and rejection metrics.
fn respond<T: Serialize>(
    route: &'static str,
    uri: &Uri,
    started: Instant,
    outcome: Result<(StatusCode, Option<T>), ApiError>,
) -> Response {
    let response = match outcome {
        Ok((status, Some(body))) => (status, Json(body)).into_response(),
        Ok((status, None)) => status.into_response(),
        Err(err) => {
            let code = err.error().code();
            observability::record_order_rejection(route, code.reason());
            tracing::debug!(
                route,
                path = %uri.path(),
                code = %code,
                message = err.error().message(),
                "Request failed"
            );
            err.into_response()
        }
    };
    observability::record_http_request(
        route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

fn ledger_error(uri: &Uri) -> impl Fn(LedgerError) -> ApiError + '_ {
    move |e| ApiError::new(BrokerageError::from(&e), uri.path())
}

fn request_error(uri: &Uri, message: String) -> ApiError {
    ApiError::new(BrokerageError::invalid_request(message), uri.path())
}

/// Health check endpoint.
async fn health_check<S, E>(State(state): State<AppState<S, E>>) -> impl IntoResponse
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// `GET /api/v1/assets?customer_id=`
async fn list_assets<S, E>(
    State(state): State<AppState<S, E>>,
    Caller(principal): Caller,
    uri: Uri,
    params: Result<Query<ListAssetsParams>, QueryRejection>,
) -> Response
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    let started = Instant::now();
    let outcome = async {
        let Query(params) = params.map_err(|e| request_error(&uri, e.body_text()))?;
        let customer_id = params
            .customer_id
            .map_or_else(|| principal.customer_id().clone(), CustomerId::new);
        let assets = state
            .list_assets
            .execute(&principal, &customer_id)
            .await
            .map_err(ledger_error(&uri))?;
        Ok::<_, ApiError>((StatusCode::OK, Some(assets)))
    }
    .await;
    respond("list_assets", &uri, started, outcome)
}

/// `POST /api/v1/orders`
async fn create_order<S, E>(
    State(state): State<AppState<S, E>>,
    Caller(principal): Caller,
    uri: Uri,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Response
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    let started = Instant::now();
    let outcome = async {
        let Json(request) = body.map_err(|e| request_error(&uri, e.body_text()))?;
        let order = state
            .create_order
            .execute(&principal, request.into_dto(&principal))
            .await
            .map_err(ledger_error(&uri))?;
        Ok::<_, ApiError>((StatusCode::OK, Some(order)))
    }
    .await;
    respond("create_order", &uri, started, outcome)
}

/// `GET /api/v1/orders?customer_id=&start_date=&end_date=`
async fn list_orders<S, E>(
    State(state): State<AppState<S, E>>,
    Caller(principal): Caller,
    uri: Uri,
    params: Result<Query<ListOrdersParams>, QueryRejection>,
) -> Response
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    let started = Instant::now();
    let outcome = async {
        let Query(params) = params.map_err(|e| request_error(&uri, e.body_text()))?;
        let (from, to) = params
            .window()
            .map_err(|e| ApiError::new(e, uri.path()))?;
        let query = ListOrdersQuery {
            customer_id: params
                .customer_id
                .map_or_else(|| principal.customer_id().clone(), CustomerId::new),
            from,
            to,
        };
        let orders = state
            .list_orders
            .execute(&principal, query)
            .await
            .map_err(ledger_error(&uri))?;
        Ok::<_, ApiError>((StatusCode::OK, Some(orders)))
    }
    .await;
    respond("list_orders", &uri, started, outcome)
}

/// `DELETE /api/v1/orders/{order_id}`
async fn cancel_order<S, E>(
    State(state): State<AppState<S, E>>,
    Caller(principal): Caller,
    uri: Uri,
    Path(order_id): Path<String>,
) -> Response
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    let started = Instant::now();
    let outcome = async {
        state
            .cancel_order
            .execute(&principal, &OrderId::new(order_id))
            .await
            .map_err(ledger_error(&uri))?;
        Ok::<_, ApiError>((StatusCode::NO_CONTENT, None::<()>))
    }
    .await;
    respond("cancel_order", &uri, started, outcome)
}

/// `POST /api/v1/orders/{order_id}/match`
async fn match_order<S, E>(
    State(state): State<AppState<S, E>>,
    Caller(principal): Caller,
    uri: Uri,
    Path(order_id): Path<String>,
) -> Response
where
    S: LedgerStore,
    E: EventPublisherPort,
{
    let started = Instant::now();
    let outcome = async {
        let order = state
            .match_order
            .execute(&principal, &OrderId::new(order_id))
            .await
            .map_err(ledger_error(&uri))?;
        Ok::<_, ApiError>((StatusCode::OK, Some(order)))
    }
    .await;
    respond("match_order", &uri, started, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::{AssetDto, OrderDto};
    use crate::application::ports::NoOpEventPublisher;
    use crate::application::services::{BalanceReservationEngine, ConflictRetryPolicy};
    use crate::domain::order_execution::OrderStatus;
    use crate::domain::shared::{Quantity, Symbol};
    use crate::error::HttpErrorResponse;
    use crate::infrastructure::persistence::InMemoryLedgerStore;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    async fn create_test_state() -> AppState<InMemoryLedgerStore, NoOpEventPublisher> {
        let store = Arc::new(InMemoryLedgerStore::new());
        let balances = Arc::new(BalanceReservationEngine::new(
            Arc::clone(&store),
            ConflictRetryPolicy::default(),
            Symbol::new("TRY"),
        ));
        balances
            .settle_credit(&CustomerId::new("john"), &Symbol::new("TRY"), Quantity::from_i64(1000))
            .await
            .unwrap();
        let events = Arc::new(NoOpEventPublisher);

        AppState {
            create_order: Arc::new(CreateOrderUseCase::new(Arc::clone(&balances), Arc::clone(&events))),
            cancel_order: Arc::new(CancelOrderUseCase::new(Arc::clone(&balances), Arc::clone(&events))),
            match_order: Arc::new(MatchOrderUseCase::new(Arc::clone(&balances), Arc::clone(&events))),
            list_orders: Arc::new(ListOrdersUseCase::new(Arc::clone(&store))),
            list_assets: Arc::new(ListAssetsUseCase::new(Arc::clone(&store))),
            version: "1.0.0-test".to_string(),
        }
    }

    fn place_order(customer: &str) -> Request<Body> {
        let body = serde_json::json!({
            "asset_name": "AAPL",
            "side": "BUY",
            "size": 10,
            "price": 50
        });
        Request::builder()
            .method("POST")
            .uri("/api/v1/orders")
            .header("content-type", "application/json")
            .header("x-customer-id", customer)
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = create_router(create_test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = read_json(response).await;
        assert_eq!(health.version, "1.0.0-test");
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let app = create_router(create_test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/assets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error: HttpErrorResponse = read_json(response).await;
        assert_eq!(error.code, "AUTH_001");
        assert_eq!(error.path, "/api/v1/assets");
    }

    #[tokio::test]
    async fn create_order_reserves_balance() {
        let state = create_test_state().await;
        let app = create_router(state.clone());

        let response = app.clone().oneshot(place_order("john")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let order: OrderDto = read_json(response).await;
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_id, "john");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/assets")
                    .header("x-customer-id", "john")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let assets: Vec<AssetDto> = read_json(response).await;
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].usable_size, dec!(500));
    }

    #[tokio::test]
    async fn insufficient_balance_is_bad_request() {
        let app = create_router(create_test_state().await);

        app.clone().oneshot(place_order("john")).await.unwrap();
        app.clone().oneshot(place_order("john")).await.unwrap();
        let response = app.oneshot(place_order("john")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: HttpErrorResponse = read_json(response).await;
        assert_eq!(error.code, "ORDER_001");
        assert_eq!(error.details.get("available").map(String::as_str), Some("0"));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = create_router(create_test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/orders")
                    .header("content-type", "application/json")
                    .header("x-customer-id", "john")
                    .body(Body::from("{\"asset_name\": \"AAPL\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: HttpErrorResponse = read_json(response).await;
        assert_eq!(error.code, "REQUEST_001");
    }

    #[tokio::test]
    async fn cancel_then_cancel_again_conflicts() {
        let app = create_router(create_test_state().await);

        let order: OrderDto = read_json(app.clone().oneshot(place_order("john")).await.unwrap()).await;
        let cancel = || {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/orders/{}", order.id))
                .header("x-customer-id", "john")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(cancel()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(cancel()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: HttpErrorResponse = read_json(response).await;
        assert_eq!(error.code, "ORDER_004");
    }

    #[tokio::test]
    async fn match_requires_admin() {
        let app = create_router(create_test_state().await);
        let order: OrderDto = read_json(app.clone().oneshot(place_order("john")).await.unwrap()).await;
        let matched = |admin: &str| {
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/orders/{}/match", order.id))
                .header("x-customer-id", "admin")
                .header("x-customer-admin", admin)
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(matched("false")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(matched("true")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let settled: OrderDto = read_json(response).await;
        assert_eq!(settled.status, OrderStatus::Matched);
    }

    #[tokio::test]
    async fn list_orders_rejects_bad_dates_and_foreign_customers() {
        let app = create_router(create_test_state().await);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/orders?start_date=yesterday")
                    .header("x-customer-id", "john")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/orders?customer_id=john")
                    .header("x-customer-id", "jane")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn list_orders_returns_window() {
        let app = create_router(create_test_state().await);
        app.clone().oneshot(place_order("john")).await.unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/orders?customer_id=john&start_date=2000-01-01T00:00:00")
                    .header("x-customer-id", "admin")
                    .header("x-customer-admin", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let orders: Vec<OrderDto> = read_json(response).await;
        assert_eq!(orders.len(), 1);
    }
}
