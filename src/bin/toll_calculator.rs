//! toll-calculator: distance calculation service
//!
//! Reads newline-delimited JSON telemetry (`{"obuID","lat","long","unix"}`)
//! from stdin, turns consecutive readings of a vehicle into distance deltas
//! and forwards them to the aggregator.
//!
//! ## Architecture
//! ```text
//! [stdin] -> [ShardRouter] -> N x [Logged(Instrumented(DistanceCalculator))] -> [toll-aggregator]
//! ```
//!
//! ## Configuration
//! - `--config <path>` / `TOLL_CONFIG`: YAML config file
//! - `TOLL__INGEST__AGGREGATOR__TRANSPORT`: `grpc` (default) or `http`
//! - `TOLL__INGEST__AGGREGATOR__ADDRESS`: `host:port` (gRPC) or base URL (HTTP)
//! - `TOLL__INGEST__SHARDS`, `TOLL__INGEST__MAX_RETRIES`, `TOLL__INGEST__REQUEST_TIMEOUT_MS`
//! - `TOLL_LOG`: tracing filter (default `info`)

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use toll_calculator::advice::decorate_calculator;
use toll_calculator::clients::{GrpcInvoiceClient, HttpInvoiceClient, InvoiceClient};
use toll_calculator::config::{Config, TransportKind};
use toll_calculator::ingest::{spawn_pipeline, JsonLinesFeed, PipelineOptions};
use toll_calculator::services::DistanceCalculator;
use toll_calculator::transport::{self, rest};
use toll_calculator::utils::bootstrap::{
    connect_with_retry, init_tracing, parse_config_path, shutdown_signal,
};
use toll_calculator::utils::metrics::install_metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    if config.metrics.enabled {
        match install_metrics("toll-calculator") {
            Ok(handle) => {
                let listener = transport::bind(&config.server.host, config.metrics.port).await?;
                tokio::spawn(rest::serve(
                    listener,
                    rest::metrics_router(handle),
                    shutdown.clone().cancelled_owned(),
                ));
            }
            Err(e) => warn!(error = %e, "metrics disabled"),
        }
    }

    let endpoint = &config.ingest.aggregator;
    let client: Arc<dyn InvoiceClient> = match endpoint.transport {
        TransportKind::Grpc => {
            let address = endpoint.address.as_str();
            Arc::new(
                connect_with_retry("aggregator", address, || {
                    GrpcInvoiceClient::connect(address)
                })
                .await?,
            )
        }
        TransportKind::Http => Arc::new(HttpInvoiceClient::new(endpoint.address.clone())?),
    };

    let calculator = decorate_calculator(DistanceCalculator::new(client));

    info!(
        topic = %config.ingest.topic,
        aggregator = %endpoint.address,
        transport = ?endpoint.transport,
        "toll-calculator starting"
    );

    let pipeline = spawn_pipeline(
        JsonLinesFeed::stdin(),
        calculator,
        &PipelineOptions::from(&config.ingest),
        shutdown.clone(),
    );
    let stats = pipeline.join().await?;
    shutdown.cancel();

    info!(
        routed = stats.routed,
        emitted = stats.consumers.emitted,
        dropped = stats.consumers.dropped,
        "toll-calculator stopped"
    );
    Ok(())
}
