//! Client error mapping against misbehaving and slow aggregators.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;

use toll_calculator::services::Aggregator;
use toll_calculator::transport;
use toll_client::proto::AggregateRequest;
use toll_client::{
    BillingError, CallContext, DistanceDelta, GrpcInvoiceClient, HttpInvoiceClient,
    InvoiceClient, InvoiceSnapshot,
};

const STALL: Duration = Duration::from_secs(10);
const DEADLINE: Duration = Duration::from_millis(200);

fn request(obu_id: i64) -> AggregateRequest {
    AggregateRequest {
        obu_id,
        value: 1.0,
        unix: 1,
    }
}

/// Aggregator that never answers within a test's deadline.
struct StalledAggregator;

#[async_trait]
impl Aggregator for StalledAggregator {
    async fn aggregate_distance(&self, _delta: DistanceDelta) -> toll_client::Result<()> {
        tokio::time::sleep(STALL).await;
        Ok(())
    }

    async fn calculate_invoice(&self, vehicle_id: i64) -> toll_client::Result<InvoiceSnapshot> {
        tokio::time::sleep(STALL).await;
        Err(BillingError::NotFound(vehicle_id))
    }
}

async fn serve_stub(app: Router) -> String {
    let listener = transport::bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

async fn stalled_grpc_client() -> GrpcInvoiceClient {
    let listener = transport::bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(transport::serve_grpc(
        Arc::new(StalledAggregator),
        listener,
        std::future::pending(),
    ));
    GrpcInvoiceClient::connect(&addr.to_string()).await.unwrap()
}

#[tokio::test]
async fn test_http_non_json_invoice_is_malformed_response() {
    let base = serve_stub(Router::new().route("/invoice", get(|| async { "garbage" }))).await;
    let client = HttpInvoiceClient::new(base).unwrap();

    let err = client
        .get_invoice(&CallContext::with_timeout(Duration::from_secs(5)), 42)
        .await
        .unwrap_err();

    match err {
        BillingError::Transport(message) => {
            assert!(message.contains("malformed response"), "got {message}")
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_invoice_missing_fields_is_malformed_response() {
    let base = serve_stub(Router::new().route(
        "/invoice",
        get(|| async { (StatusCode::OK, r#"{"obuID":42}"#) }),
    ))
    .await;
    let client = HttpInvoiceClient::new(base).unwrap();

    let err = client
        .get_invoice(&CallContext::with_timeout(Duration::from_secs(5)), 42)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_http_deadline_fires_during_slow_call() {
    let stall = || async {
        tokio::time::sleep(STALL).await;
        "{}"
    };
    let base = serve_stub(
        Router::new()
            .route("/invoice", get(stall))
            .route("/aggregate", post(stall)),
    )
    .await;
    let client = HttpInvoiceClient::new(base).unwrap();

    let started = Instant::now();
    let err = client
        .aggregate(&CallContext::with_timeout(DEADLINE), request(5))
        .await
        .unwrap_err();
    assert_eq!(err, BillingError::DeadlineExceeded);

    let err = client
        .get_invoice(&CallContext::with_timeout(DEADLINE), 5)
        .await
        .unwrap_err();
    assert_eq!(err, BillingError::DeadlineExceeded);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_grpc_deadline_fires_during_slow_call() {
    let client = stalled_grpc_client().await;

    let started = Instant::now();
    let err = client
        .aggregate(&CallContext::with_timeout(DEADLINE), request(5))
        .await
        .unwrap_err();
    assert_eq!(err, BillingError::DeadlineExceeded);

    let err = client
        .get_invoice(&CallContext::with_timeout(DEADLINE), 5)
        .await
        .unwrap_err();
    assert_eq!(err, BillingError::DeadlineExceeded);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_grpc_cancel_during_slow_call() {
    let client = stalled_grpc_client().await;
    let token = CancellationToken::new();
    let ctx = CallContext::background().with_token(token.clone());

    tokio::spawn(async move {
        tokio::time::sleep(DEADLINE).await;
        token.cancel();
    });

    let started = Instant::now();
    let err = client.aggregate(&ctx, request(5)).await.unwrap_err();
    assert_eq!(err, BillingError::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
}
