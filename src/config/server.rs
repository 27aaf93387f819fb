//! Server and observability configuration types.

use serde::Deserialize;

/// Listen addresses for the aggregator's two front ends.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port for the `toll.Aggregator` gRPC service.
    pub grpc_port: u16,
    /// Port for the HTTP/JSON binding.
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            grpc_port: 3001,
            http_port: 3000,
        }
    }
}

/// Prometheus exposition.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the recorder and serve `GET /metrics`.
    pub enabled: bool,
    /// Port of the calculator's own `/metrics` listener. The aggregator
    /// serves metrics on its HTTP port instead.
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9091,
        }
    }
}
