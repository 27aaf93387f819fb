//! Prometheus recorder for the `metrics` facade.
//!
//! The advice layer emits through `metrics::counter!`/`histogram!`; this
//! installs the process-wide recorder and hands back the handle rendered at
//! `GET /metrics`.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Fails if a recorder is already installed for this process.
pub fn install_metrics(service: &'static str) -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .add_global_label("service", service)
        .install_recorder()?;

    info!(service, "Prometheus recorder installed");
    Ok(handle)
}
