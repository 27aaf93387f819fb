//! Metrics instrumentation advice.
//!
//! Wraps service traits to emit Prometheus-compatible metrics
//! without modifying core implementations.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::services::{Aggregator, Calculator};
use toll_client::{CallContext, DistanceDelta, InvoiceSnapshot, Result, TelemetryReading};

/// Wrapper that adds metrics instrumentation to any service implementation.
///
/// Emits counters and histograms for all operations:
/// - `toll_requests_total` - Calls (by component, operation, outcome)
/// - `toll_request_duration_seconds` - Operation latencies (by component, operation)
/// - `toll_deltas_emitted_total` - Deltas forwarded by the calculator
///
/// # Example
///
/// ```ignore
/// let aggregator = InvoiceAggregator::new(store);
/// let aggregator = Instrumented::new(aggregator, "aggregator");
/// ```
pub struct Instrumented<T> {
    inner: T,
    component: &'static str,
}

impl<T> Instrumented<T> {
    /// Wrap a service with metrics instrumentation.
    ///
    /// # Arguments
    /// * `inner` - The service implementation to wrap
    /// * `component` - Label for metrics (e.g., "aggregator", "calculator")
    pub fn new(inner: T, component: &'static str) -> Self {
        Self { inner, component }
    }

    /// Get a reference to the inner service.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper and return the inner service.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn record<R>(&self, operation: &'static str, start: Instant, result: &Result<R>) {
        histogram!(
            "toll_request_duration_seconds",
            "component" => self.component,
            "operation" => operation
        )
        .record(start.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        counter!(
            "toll_requests_total",
            "component" => self.component,
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
    }
}

#[async_trait]
impl<T: Aggregator> Aggregator for Instrumented<T> {
    async fn aggregate_distance(&self, delta: DistanceDelta) -> Result<()> {
        let start = Instant::now();

        let result = self.inner.aggregate_distance(delta).await;

        self.record("aggregate", start, &result);
        result
    }

    async fn calculate_invoice(&self, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        let start = Instant::now();

        let result = self.inner.calculate_invoice(vehicle_id).await;

        self.record("get_invoice", start, &result);
        result
    }
}

#[async_trait]
impl<T: Calculator> Calculator for Instrumented<T> {
    async fn ingest(
        &self,
        ctx: &CallContext,
        reading: TelemetryReading,
    ) -> Result<Option<DistanceDelta>> {
        let start = Instant::now();

        let result = self.inner.ingest(ctx, reading).await;

        self.record("ingest", start, &result);
        if let Ok(Some(_)) = &result {
            counter!("toll_deltas_emitted_total", "component" => self.component).increment(1);
        }

        result
    }
}
