//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use toll_calculator::advice::decorate_aggregator;
use toll_calculator::services::{Aggregator, InvoiceAggregator};
use toll_calculator::storage::MemoryStore;
use toll_calculator::transport::{self, rest};
use toll_client::{GrpcInvoiceClient, HttpInvoiceClient};

/// Rate used by the worked billing example.
pub const RATE: f64 = 3.15;

/// Both front ends over one aggregator. Servers stop when this is dropped.
pub struct TestServers {
    pub grpc_addr: SocketAddr,
    pub http_addr: SocketAddr,
    pub aggregator: Arc<dyn Aggregator>,
    shutdown: CancellationToken,
}

impl TestServers {
    pub async fn start(rate: f64) -> Self {
        let store = Arc::new(MemoryStore::new(rate));
        let aggregator = decorate_aggregator(InvoiceAggregator::new(store));
        let shutdown = CancellationToken::new();

        let grpc_listener = transport::bind("127.0.0.1", 0).await.unwrap();
        let http_listener = transport::bind("127.0.0.1", 0).await.unwrap();
        let grpc_addr = grpc_listener.local_addr().unwrap();
        let http_addr = http_listener.local_addr().unwrap();

        tokio::spawn(transport::serve_grpc(
            Arc::clone(&aggregator),
            grpc_listener,
            shutdown.clone().cancelled_owned(),
        ));
        tokio::spawn(rest::serve(
            http_listener,
            rest::router(Arc::clone(&aggregator), None),
            shutdown.clone().cancelled_owned(),
        ));

        Self {
            grpc_addr,
            http_addr,
            aggregator,
            shutdown,
        }
    }

    pub fn http_base(&self) -> String {
        format!("http://{}", self.http_addr)
    }

    pub async fn grpc_client(&self) -> GrpcInvoiceClient {
        GrpcInvoiceClient::connect(&self.grpc_addr.to_string())
            .await
            .expect("failed to connect gRPC client")
    }

    pub fn http_client(&self) -> HttpInvoiceClient {
        HttpInvoiceClient::new(self.http_base()).expect("failed to build HTTP client")
    }
}

impl Drop for TestServers {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
