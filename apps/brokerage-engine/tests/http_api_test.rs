//! HTTP API integration tests.
//!
//! Loads the shipped configuration, seeds the demo balances and drives the
//! REST API: HTTP → use cases → ledger store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tower::ServiceExt;

use brokerage_engine::application::dto::{AssetDto, OrderDto};
use brokerage_engine::config::load_config_from_string;
use brokerage_engine::domain::order_execution::OrderStatus;
use brokerage_engine::error::HttpErrorResponse;
use brokerage_engine::infrastructure::config::Container;
use brokerage_engine::infrastructure::http::{AppState, create_router};

async fn seeded_app() -> Router {
    let config = load_config_from_string(include_str!("../config/config.yaml")).unwrap();
    let container = Container::in_memory(&config);
    container.seed_demo_data(&config.seed).await.unwrap();

    create_router(AppState {
        create_order: Arc::new(container.create_order_use_case()),
        cancel_order: Arc::new(container.cancel_order_use_case()),
        match_order: Arc::new(container.match_order_use_case()),
        list_orders: Arc::new(container.list_orders_use_case()),
        list_assets: Arc::new(container.list_assets_use_case()),
        version: "test".to_string(),
    })
}

fn get(uri: &str, customer: &str, admin: bool) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-customer-id", customer)
        .header("x-customer-admin", if admin { "true" } else { "false" })
        .body(Body::empty())
        .unwrap()
}

fn send(method: &str, uri: &str, customer: &str, admin: bool, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-customer-id", customer)
        .header("x-customer-admin", if admin { "true" } else { "false" });
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn usable(app: &Router, customer: &str, asset: &str) -> Decimal {
    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/assets?customer_id={customer}"), customer, false))
        .await
        .unwrap();
    let assets: Vec<AssetDto> = json(response).await;
    assets
        .into_iter()
        .find(|a| a.asset_name == asset)
        .map(|a| a.usable_size)
        .unwrap_or_default()
}

#[tokio::test]
async fn seeded_balances_are_listed() {
    let app = seeded_app().await;

    let response = app.clone().oneshot(get("/api/v1/assets", "john", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let assets: Vec<AssetDto> = json(response).await;
    let names: Vec<_> = assets.iter().map(|a| a.asset_name.as_str()).collect();
    assert_eq!(names, vec!["AAPL", "GOOGL", "TRY"]);

    let response = app
        .oneshot(get("/api/v1/assets?customer_id=admin", "admin", true))
        .await
        .unwrap();
    let assets: Vec<AssetDto> = json(response).await;
    assert_eq!(assets[0].size, dec!(1000000));
}

#[tokio::test]
async fn full_buy_lifecycle_over_http() {
    let app = seeded_app().await;

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/api/v1/orders",
            "john",
            false,
            Some(serde_json::json!({
                "customer_id": "john",
                "asset_name": "MSFT",
                "side": "BUY",
                "size": 10,
                "price": "250.50"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order: OrderDto = json(response).await;
    assert_eq!(usable(&app, "john", "TRY").await, dec!(7495));

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            &format!("/api/v1/orders/{}/match", order.id),
            "admin",
            true,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let matched: OrderDto = json(response).await;
    assert_eq!(matched.status, OrderStatus::Matched);

    assert_eq!(usable(&app, "john", "MSFT").await, dec!(10));

    let response = app
        .oneshot(get("/api/v1/orders?customer_id=john", "john", false))
        .await
        .unwrap();
    let orders: Vec<OrderDto> = json(response).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Matched);
}

#[tokio::test]
async fn customer_cannot_place_for_someone_else() {
    let app = seeded_app().await;

    let response = app
        .oneshot(send(
            "POST",
            "/api/v1/orders",
            "jane",
            false,
            Some(serde_json::json!({
                "customer_id": "john",
                "asset_name": "AAPL",
                "side": "SELL",
                "size": 1,
                "price": 10
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let error: HttpErrorResponse = json(response).await;
    assert_eq!(error.code, "AUTH_002");
}

#[tokio::test]
async fn sell_more_than_held_is_rejected() {
    let app = seeded_app().await;

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/api/v1/orders",
            "jane",
            false,
            Some(serde_json::json!({
                "asset_name": "GOOGL",
                "side": "SELL",
                "size": 51,
                "price": 100
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: HttpErrorResponse = json(response).await;
    assert_eq!(error.code, "ORDER_001");
    assert_eq!(usable(&app, "jane", "GOOGL").await, dec!(50));
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = seeded_app().await;

    let response = app
        .oneshot(send("DELETE", "/api/v1/orders/does-not-exist", "john", false, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: HttpErrorResponse = json(response).await;
    assert_eq!(error.code, "ORDER_003");
    assert_eq!(error.path, "/api/v1/orders/does-not-exist");
}
