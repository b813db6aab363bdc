use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use stock_service::api::{create_router, AppState};
use stock_service::*;
use tower::ServiceExt;
use uuid::Uuid;

async fn app_with_product(quantity: i32) -> (Router, Uuid) {
    let store = Arc::new(MemoryStockStore::new());
    let id = Uuid::new_v4();
    store.create_record(id, quantity).await.unwrap();
    let service = StockService::new(store, Arc::new(MemoryStockCache::new()));
    (create_router(AppState { service }), id)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn reserve_request(product_id: Uuid, quantity: i32) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/stock/reserve")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "product_id": product_id, "quantity": quantity }).to_string()))
        .unwrap()
}

fn stock_request(path: String) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn lookup_returns_quantity_envelope() {
    let (app, id) = app_with_product(10).await;
    let (status, body) = send(&app, stock_request(format!("/stock/{}", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["quantity"], 10);
    assert_eq!(body["data"]["product_id"], id.to_string());
}

#[tokio::test]
async fn unknown_product_reads_as_zero() {
    let (app, _) = app_with_product(10).await;
    let (status, body) = send(&app, stock_request(format!("/stock/{}", Uuid::new_v4()))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 0);
}

#[tokio::test]
async fn malformed_product_id_is_bad_request() {
    let (app, _) = app_with_product(10).await;
    let (status, body) = send(&app, stock_request("/stock/not-a-uuid".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn reserve_then_read_back() {
    let (app, id) = app_with_product(10).await;

    let (status, body) = send(&app, reserve_request(id, 4)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "reserved");

    let (status, body) = send(&app, reserve_request(id, 10)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "insufficient or untracked stock");

    let (_, body) = send(&app, stock_request(format!("/stock/{}", id))).await;
    assert_eq!(body["data"]["quantity"], 6);
}

#[tokio::test]
async fn reserving_untracked_product_is_conflict() {
    let (app, _) = app_with_product(10).await;
    let (status, body) = send(&app, reserve_request(Uuid::new_v4(), 1)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
    assert_eq!(body["message"], "insufficient or untracked stock");
}

#[tokio::test]
async fn non_positive_quantity_is_bad_request() {
    let (app, id) = app_with_product(10).await;
    for quantity in [0, -1] {
        let (status, _) = send(&app, reserve_request(id, quantity)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, body) = send(&app, stock_request(format!("/stock/{}", id))).await;
    assert_eq!(body["data"]["quantity"], 10);
}

#[tokio::test]
async fn health_check_answers_ok() {
    let (app, _) = app_with_product(1).await;
    let response = app.oneshot(stock_request("/health".to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
