//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod ingest;
mod server;

pub use ingest::{AggregatorEndpoint, BillingConfig, IngestConfig, TransportKind};
pub use server::{MetricsConfig, ServerConfig};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "TOLL_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "TOLL";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "TOLL_LOG";

use serde::Deserialize;

/// Configuration errors detected after loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("billing.rate must be finite and non-negative, got {0}")]
    InvalidRate(f64),
    #[error("ingest.shards must be at least 1")]
    NoShards,
    #[error("ingest.channel_capacity must be at least 1")]
    NoCapacity,
    #[error("ingest.aggregator.address must not be empty")]
    MissingAddress,
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen addresses (aggregator).
    pub server: ServerConfig,
    /// Pricing (aggregator).
    pub billing: BillingConfig,
    /// Telemetry ingestion (calculator).
    pub ingest: IngestConfig,
    /// Prometheus exposition.
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix, e.g.
    ///    `TOLL__BILLING__RATE=2.5`
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.billing.rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::InvalidRate(rate));
        }
        if self.ingest.shards == 0 {
            return Err(ConfigError::NoShards);
        }
        if self.ingest.channel_capacity == 0 {
            return Err(ConfigError::NoCapacity);
        }
        if self.ingest.aggregator.address.trim().is_empty() {
            return Err(ConfigError::MissingAddress);
        }
        Ok(())
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
