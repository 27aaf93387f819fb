//! The two transports must be indistinguishable to a client.

use std::time::Duration;

use crate::common::{approx_eq, TestServers, RATE};
use toll_calculator::services::Aggregator;
use toll_client::proto::AggregateRequest;
use toll_client::{BillingError, CallContext, InvoiceClient};

fn request(obu_id: i64, value: f64) -> AggregateRequest {
    AggregateRequest {
        obu_id,
        value,
        unix: 1,
    }
}

#[tokio::test]
async fn test_worked_example_over_both_transports() {
    let servers = TestServers::start(RATE).await;
    let grpc = servers.grpc_client().await;
    let http = servers.http_client();
    let ctx = CallContext::with_timeout(Duration::from_secs(5));

    grpc.aggregate(&ctx, request(42, 30.0)).await.unwrap();
    http.aggregate(&ctx, request(42, 38.55)).await.unwrap();

    let via_grpc = grpc.get_invoice(&ctx, 42).await.unwrap();
    let via_http = http.get_invoice(&ctx, 42).await.unwrap();

    assert_eq!(via_grpc, via_http);
    assert_eq!(via_grpc.vehicle_id, 42);
    assert!(approx_eq(via_grpc.total_distance, 68.55));
    assert!(approx_eq(via_grpc.total_amount, 215.9325));
}

#[tokio::test]
async fn test_unknown_vehicle_is_not_found_on_both() {
    let servers = TestServers::start(RATE).await;
    let grpc = servers.grpc_client().await;
    let http = servers.http_client();
    let ctx = CallContext::background();

    assert_eq!(
        grpc.get_invoice(&ctx, 999).await.unwrap_err(),
        BillingError::NotFound(999)
    );
    assert_eq!(
        http.get_invoice(&ctx, 999).await.unwrap_err(),
        BillingError::NotFound(999)
    );

    let response = reqwest::get(format!("{}/invoice?obu=999", servers.http_base()))
        .await
        .unwrap();
    assert_ne!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("totalDistance").is_none());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_validation_is_reported_identically() {
    let servers = TestServers::start(RATE).await;
    let grpc = servers.grpc_client().await;
    let http = servers.http_client();
    let ctx = CallContext::background();

    let via_grpc = grpc.aggregate(&ctx, request(7, -1.0)).await.unwrap_err();
    let via_http = http.aggregate(&ctx, request(7, -1.0)).await.unwrap_err();
    assert!(via_grpc.is_validation(), "gRPC: {via_grpc:?}");
    assert!(via_http.is_validation(), "HTTP: {via_http:?}");

    assert!(grpc.get_invoice(&ctx, 0).await.unwrap_err().is_validation());
    assert!(http.get_invoice(&ctx, 0).await.unwrap_err().is_validation());

    // Neither rejected delta created state.
    assert!(grpc.get_invoice(&ctx, 7).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_expired_context_never_reaches_server() {
    let servers = TestServers::start(RATE).await;
    let grpc = servers.grpc_client().await;
    let http = servers.http_client();
    let expired = CallContext::with_timeout(Duration::ZERO);

    assert_eq!(
        grpc.aggregate(&expired, request(11, 1.0)).await.unwrap_err(),
        BillingError::DeadlineExceeded
    );
    assert_eq!(
        http.aggregate(&expired, request(11, 1.0)).await.unwrap_err(),
        BillingError::DeadlineExceeded
    );

    let cancelled = CallContext::background();
    cancelled.cancel();
    assert_eq!(
        grpc.aggregate(&cancelled, request(11, 1.0)).await.unwrap_err(),
        BillingError::Cancelled
    );

    let err = servers.aggregator.calculate_invoice(11).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bindings_share_one_store() {
    let servers = TestServers::start(RATE).await;
    let http = servers.http_client();
    let ctx = CallContext::background();

    http.aggregate(&ctx, request(3, 2.0)).await.unwrap();

    let direct = servers.aggregator.calculate_invoice(3).await.unwrap();
    let via_grpc = servers.grpc_client().await.get_invoice(&ctx, 3).await.unwrap();
    assert_eq!(direct, via_grpc);
    assert!(approx_eq(direct.total_amount, 2.0 * RATE));
}
