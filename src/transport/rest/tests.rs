//! Unit tests for the HTTP binding.

use axum::body::{to_bytes, Body};
use axum::http::Request;
use tower::ServiceExt;

use super::*;
use crate::services::InvoiceAggregator;
use crate::storage::MemoryStore;

fn app() -> Router {
    let store = Arc::new(MemoryStore::new(3.15));
    router(Arc::new(InvoiceAggregator::new(store)), None)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/aggregate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_aggregate_then_invoice() {
    let app = app();

    let (status, _) = send(&app, post_json(r#"{"obuID":42,"value":68.55,"unix":1}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_request("/invoice?obu=42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["obuID"], 42);
    assert!((body["totalDistance"].as_f64().unwrap() - 68.55).abs() < 1e-9);
    assert!((body["totalAmount"].as_f64().unwrap() - 215.9325).abs() < 1e-9);
}

#[tokio::test]
async fn test_unknown_vehicle_is_404_without_invoice() {
    let (status, body) = send(&app(), get_request("/invoice?obu=999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("totalDistance").is_none());
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_missing_or_non_numeric_obu_is_400() {
    let app = app();
    for uri in ["/invoice", "/invoice?obu=", "/invoice?obu=abc", "/invoice?obu=1.5"] {
        let (status, body) = send(&app, get_request(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert!(body["error"].is_string(), "uri {uri}");
    }
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = app();
    for body in ["", "not json", r#"{"obuID":"x","value":1,"unix":1}"#, r#"{"obuID":1}"#] {
        let (status, _) = send(&app, post_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
    }
}

#[tokio::test]
async fn test_negative_distance_is_400_and_not_applied() {
    let app = app();
    let (status, _) = send(&app, post_json(r#"{"obuID":5,"value":-1.0,"unix":1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get_request("/invoice?obu=5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_400() {
    let app = app();
    let request = Request::builder()
        .method("GET")
        .uri("/aggregate")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("GET"));

    let request = Request::builder()
        .method("DELETE")
        .uri("/invoice?obu=1")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_without_recorder_is_404() {
    let (status, _) = send(&app(), get_request("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (status, _) = send(&app(), get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
}
