//! Telemetry in, invoices out.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::common::{TestServers, RATE};
use toll_calculator::advice::decorate_calculator;
use toll_calculator::ingest::{spawn_pipeline, JsonLinesFeed, PipelineOptions, RetryPolicy};
use toll_calculator::services::{Aggregator, DistanceCalculator};
use toll_client::{CallContext, InvoiceClient};

/// Four readings per vehicle along the equator, one degree of longitude apart.
fn telemetry(vehicles: &[i64]) -> String {
    let mut lines = String::new();
    for step in 0..4 {
        for id in vehicles {
            lines.push_str(&format!(
                "{{\"obuID\":{id},\"lat\":0.0,\"long\":{step}.0,\"unix\":{}}}\n",
                1_000 + step
            ));
        }
    }
    lines
}

fn options() -> PipelineOptions {
    PipelineOptions {
        shards: 3,
        channel_capacity: 8,
        retry: RetryPolicy {
            max_retries: 2,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            request_timeout: Some(Duration::from_secs(5)),
        },
    }
}

async fn run(client: Arc<dyn InvoiceClient>, input: String) {
    let calculator = decorate_calculator(DistanceCalculator::new(client));
    let pipeline = spawn_pipeline(
        JsonLinesFeed::new(std::io::Cursor::new(input.into_bytes())),
        calculator,
        &options(),
        CancellationToken::new(),
    );
    let stats = pipeline.join().await.unwrap();
    assert_eq!(stats.consumers.dropped, 0);
}

#[tokio::test]
async fn test_pipeline_over_grpc() {
    let servers = TestServers::start(RATE).await;
    let client: Arc<dyn InvoiceClient> = Arc::new(servers.grpc_client().await);

    run(client, telemetry(&[1, 2, 3, 4])).await;

    let http = servers.http_client();
    for id in 1..=4 {
        let invoice = http
            .get_invoice(&CallContext::background(), id)
            .await
            .unwrap();
        assert!((invoice.total_distance - 3.0 * 111.195).abs() < 0.05, "{invoice:?}");
        assert!((invoice.total_amount - invoice.total_distance * RATE).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_pipeline_over_http() {
    let servers = TestServers::start(RATE).await;
    let client: Arc<dyn InvoiceClient> = Arc::new(servers.http_client());

    run(client, telemetry(&[10, 11])).await;

    let grpc = servers.grpc_client().await;
    for id in [10, 11] {
        let invoice = grpc.get_invoice(&CallContext::background(), id).await.unwrap();
        assert!((invoice.total_distance - 3.0 * 111.195).abs() < 0.05, "{invoice:?}");
    }
}

#[tokio::test]
async fn test_single_reading_bills_nothing() {
    let servers = TestServers::start(RATE).await;
    let client: Arc<dyn InvoiceClient> = Arc::new(servers.grpc_client().await);

    run(
        client,
        "{\"obuID\":5,\"lat\":52.37,\"long\":4.89,\"unix\":1}\n".to_string(),
    )
    .await;

    let err = servers.aggregator.calculate_invoice(5).await.unwrap_err();
    assert!(err.is_not_found());
}
