//! Telemetry ingestion: feed -> shard router -> per-shard consumer loops.
//!
//! ```text
//! [TelemetryFeed] -> [ShardRouter] -> shard 0 -> run_consumer -> Calculator
//!                                  -> shard 1 -> run_consumer -> Calculator
//!                                  -> ...
//! ```
//!
//! Each vehicle is owned by exactly one shard, so its readings are processed
//! in feed order while different vehicles progress concurrently.

pub mod consumer;
pub mod feed;
pub mod shard;

pub use consumer::{run_consumer, ConsumerStats, RetryPolicy};
pub use feed::{ChannelFeed, JsonLinesFeed, TelemetryFeed};
pub use shard::ShardRouter;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::IngestConfig;
use crate::services::Calculator;
use toll_client::{BillingError, Result};

/// Shape of the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub shards: usize,
    pub channel_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            shards: 4,
            channel_capacity: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&IngestConfig> for PipelineOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            shards: config.shards,
            channel_capacity: config.channel_capacity,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                request_timeout: Some(Duration::from_millis(config.request_timeout_ms)),
                ..RetryPolicy::default()
            },
        }
    }
}

/// Totals across the whole pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Readings accepted from the feed.
    pub routed: usize,
    pub consumers: ConsumerStats,
}

/// Handles of a running pipeline.
pub struct Pipeline {
    router: JoinHandle<usize>,
    consumers: Vec<JoinHandle<ConsumerStats>>,
}

impl Pipeline {
    /// Wait for the feed to drain (or shutdown) and every consumer to stop.
    pub async fn join(self) -> Result<PipelineStats> {
        let routed = self
            .router
            .await
            .map_err(|e| BillingError::internal(format!("shard router task failed: {e}")))?;

        let mut consumers = ConsumerStats::default();
        for handle in self.consumers {
            consumers += handle
                .await
                .map_err(|e| BillingError::internal(format!("consumer task failed: {e}")))?;
        }

        Ok(PipelineStats { routed, consumers })
    }
}

/// Spawn the router and one consumer loop per shard.
pub fn spawn_pipeline<F>(
    feed: F,
    calculator: Arc<dyn Calculator>,
    options: &PipelineOptions,
    shutdown: CancellationToken,
) -> Pipeline
where
    F: TelemetryFeed + 'static,
{
    let (router, receivers) = ShardRouter::new(options.shards, options.channel_capacity);
    info!(
        shards = router.shards(),
        capacity = options.channel_capacity,
        "starting ingestion pipeline"
    );

    let consumers = receivers
        .into_iter()
        .enumerate()
        .map(|(shard, rx)| {
            tokio::spawn(run_consumer(
                shard,
                rx,
                Arc::clone(&calculator),
                options.retry.clone(),
                shutdown.clone(),
            ))
        })
        .collect();

    let router = tokio::spawn(router.pump(feed, shutdown));

    Pipeline { router, consumers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::LocalInvoiceClient;
    use crate::services::{Aggregator, DistanceCalculator, InvoiceAggregator};
    use crate::storage::MemoryStore;
    use toll_client::TelemetryReading;

    #[tokio::test]
    async fn test_pipeline_bills_every_vehicle() {
        let aggregator = Arc::new(InvoiceAggregator::new(Arc::new(MemoryStore::new(1.0))));
        let client = Arc::new(LocalInvoiceClient::new(Arc::clone(&aggregator)));
        let calculator: Arc<dyn Calculator> = Arc::new(DistanceCalculator::new(client));

        let (tx, feed) = ChannelFeed::new(16);
        let pipeline = spawn_pipeline(
            feed,
            calculator,
            &PipelineOptions {
                shards: 3,
                channel_capacity: 4,
                retry: RetryPolicy::default(),
            },
            CancellationToken::new(),
        );

        for t in 0..4 {
            for id in 1..=5 {
                tx.send(TelemetryReading::new(id, 0.0, t as f64, t + 1))
                    .await
                    .unwrap();
            }
        }
        drop(tx);

        let stats = pipeline.join().await.unwrap();
        assert_eq!(stats.routed, 20);
        assert_eq!(stats.consumers.processed, 20);
        assert_eq!(stats.consumers.emitted, 15);

        for id in 1..=5 {
            let invoice = aggregator.calculate_invoice(id).await.unwrap();
            // Three one-degree hops along the equator.
            assert!((invoice.total_distance - 3.0 * 111.195).abs() < 0.05);
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = IngestConfig {
            shards: 8,
            max_retries: 2,
            request_timeout_ms: 250,
            ..IngestConfig::default()
        };
        let options = PipelineOptions::from(&config);
        assert_eq!(options.shards, 8);
        assert_eq!(options.retry.max_retries, 2);
        assert_eq!(options.retry.request_timeout, Some(Duration::from_millis(250)));
    }
}
