//! Billing and ingestion configuration types.

use serde::Deserialize;

/// Price applied per kilometre.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub rate: f64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self { rate: 3.15 }
    }
}

/// Transport the calculator uses to reach the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Grpc,
    Http,
}

/// Where the calculator sends its deltas.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorEndpoint {
    /// Transport discriminator.
    pub transport: TransportKind,
    /// `host:port` for gRPC, base URL for HTTP.
    pub address: String,
}

impl Default for AggregatorEndpoint {
    fn default() -> Self {
        Self {
            transport: TransportKind::Grpc,
            address: "localhost:3001".to_string(),
        }
    }
}

/// Telemetry ingestion settings for the calculator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Name of the telemetry topic, used for log context.
    pub topic: String,
    /// Number of consumer loops; vehicles are partitioned across them.
    pub shards: usize,
    /// Bound of each shard's queue.
    pub channel_capacity: usize,
    pub aggregator: AggregatorEndpoint,
    /// Deadline for a single forward call.
    pub request_timeout_ms: u64,
    /// Redeliveries of a reading after a transient forward failure.
    pub max_retries: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            topic: "obudata".to_string(),
            shards: 4,
            channel_capacity: 1024,
            aggregator: AggregatorEndpoint::default(),
            request_timeout_ms: 5000,
            max_retries: 5,
        }
    }
}
