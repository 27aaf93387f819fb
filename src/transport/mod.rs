//! Transport bindings exposing the aggregator over gRPC and HTTP.
//!
//! Both bindings take the same `Arc<dyn Aggregator>`, so there is one
//! source of truth regardless of which front end a client uses.

pub mod grpc;
pub mod rest;

pub use grpc::AggregatorGrpc;
pub use rest::{metrics_router, router, ApiError, RestState};

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::Aggregator;
use toll_client::proto::aggregator_server::AggregatorServer;

/// Bind a TCP listener. Port 0 picks an ephemeral port.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Serve the `toll.Aggregator` gRPC service on `listener` until `signal` resolves.
///
/// Also registers the standard gRPC health service, reporting the
/// aggregator as serving.
pub async fn serve_grpc<F>(
    aggregator: Arc<dyn Aggregator>,
    listener: TcpListener,
    signal: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<AggregatorServer<AggregatorGrpc>>()
        .await;

    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "gRPC server listening");
    }

    Server::builder()
        .layer(grpc_trace_layer())
        .add_service(health_service)
        .add_service(AggregatorGrpc::new(aggregator).into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
        .await
}

/// Tower trace layer that extracts `x-correlation-id` from gRPC request headers.
///
/// Creates a tracing span per request with the correlation_id and path, so
/// the decorator logs for that call inherit both.
pub fn grpc_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::GrpcErrorsAsFailures>,
    impl Fn(&http::Request<tonic::body::BoxBody>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_grpc().make_span_with(|request: &http::Request<tonic::body::BoxBody>| {
        let correlation_id = request
            .headers()
            .get("x-correlation-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let path = request.uri().path();
        tracing::info_span!("grpc", %correlation_id, %path)
    })
}
