//! Concurrent writers over both transports.

use std::sync::Arc;

use tokio::sync::Barrier;

use crate::common::{TestServers, RATE};
use toll_calculator::services::Aggregator;
use toll_client::proto::AggregateRequest;
use toll_client::{CallContext, InvoiceClient};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deltas_are_all_counted() {
    let servers = TestServers::start(RATE).await;
    let writers = 8;
    let deltas_per_writer = 25;
    let barrier = Arc::new(Barrier::new(writers));
    let mut handles = Vec::new();

    for i in 0..writers {
        let client: Arc<dyn InvoiceClient> = if i % 2 == 0 {
            Arc::new(servers.grpc_client().await)
        } else {
            Arc::new(servers.http_client())
        };
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let ctx = CallContext::background();
            for n in 0..deltas_per_writer {
                client
                    .aggregate(
                        &ctx,
                        AggregateRequest {
                            obu_id: 77,
                            value: 0.5,
                            unix: n,
                        },
                    )
                    .await
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let invoice = servers.aggregator.calculate_invoice(77).await.unwrap();
    // 0.5 is exact in binary, so the sum is exact regardless of order.
    assert_eq!(invoice.total_distance, 0.5 * (writers * deltas_per_writer as usize) as f64);
    assert_eq!(invoice.total_amount, invoice.total_distance * RATE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_vehicles_do_not_interfere() {
    let servers = TestServers::start(RATE).await;
    let mut handles = Vec::new();

    for id in 1..=10_i64 {
        let client = servers.grpc_client().await;
        handles.push(tokio::spawn(async move {
            let ctx = CallContext::background();
            for n in 0..10 {
                client
                    .aggregate(
                        &ctx,
                        AggregateRequest {
                            obu_id: id,
                            value: id as f64,
                            unix: n,
                        },
                    )
                    .await
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    for id in 1..=10_i64 {
        let invoice = servers.aggregator.calculate_invoice(id).await.unwrap();
        assert_eq!(invoice.total_distance, 10.0 * id as f64);
    }
}
