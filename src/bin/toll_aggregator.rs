//! toll-aggregator: invoice aggregation service
//!
//! Accumulates distance deltas into per-vehicle invoices and serves them.
//!
//! ## Architecture
//! ```text
//! [toll-calculator] --gRPC :3001--+
//!                                 +--> [Logged(Instrumented(InvoiceAggregator))] -> [MemoryStore]
//! [HTTP clients] ----HTTP :3000---+
//! ```
//!
//! ## Configuration
//! - `--config <path>` / `TOLL_CONFIG`: YAML config file
//! - `TOLL__SERVER__GRPC_PORT`, `TOLL__SERVER__HTTP_PORT`, `TOLL__BILLING__RATE`
//! - `TOLL__METRICS__ENABLED`: serve Prometheus metrics at `GET /metrics`
//! - `TOLL_LOG`: tracing filter (default `info`)

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use toll_calculator::advice::decorate_aggregator;
use toll_calculator::config::Config;
use toll_calculator::services::InvoiceAggregator;
use toll_calculator::storage::MemoryStore;
use toll_calculator::transport::{self, rest};
use toll_calculator::utils::bootstrap::{init_tracing, parse_config_path, shutdown_signal};
use toll_calculator::utils::metrics::install_metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let metrics = if config.metrics.enabled {
        match install_metrics("toll-aggregator") {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "metrics disabled");
                None
            }
        }
    } else {
        None
    };

    let store = Arc::new(MemoryStore::new(config.billing.rate));
    let aggregator = decorate_aggregator(InvoiceAggregator::new(store));

    let server = &config.server;
    let grpc_listener = transport::bind(&server.host, server.grpc_port).await?;
    let http_listener = transport::bind(&server.host, server.http_port).await?;

    info!(rate = config.billing.rate, "toll-aggregator starting");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let grpc = transport::serve_grpc(
        Arc::clone(&aggregator),
        grpc_listener,
        shutdown.clone().cancelled_owned(),
    );
    let http = rest::serve(
        http_listener,
        rest::router(aggregator, metrics),
        shutdown.clone().cancelled_owned(),
    );

    let (grpc_result, http_result) = tokio::join!(grpc, http);
    // Either server stopping takes the other down with it.
    shutdown.cancel();
    grpc_result?;
    http_result?;

    info!("toll-aggregator stopped");
    Ok(())
}
