//! Logging advice.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::services::{Aggregator, Calculator};
use toll_client::{CallContext, DistanceDelta, InvoiceSnapshot, Result, TelemetryReading};

/// Wrapper that emits one structured log event per call.
///
/// Successful calls log at `info`, failures at `warn` with the error kind.
pub struct Logged<T> {
    inner: T,
    component: &'static str,
}

impl<T> Logged<T> {
    pub fn new(inner: T, component: &'static str) -> Self {
        Self { inner, component }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn took_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[async_trait]
impl<T: Aggregator> Aggregator for Logged<T> {
    async fn aggregate_distance(&self, delta: DistanceDelta) -> Result<()> {
        let start = Instant::now();

        let result = self.inner.aggregate_distance(delta).await;

        match &result {
            Ok(()) => info!(
                component = self.component,
                obu_id = delta.vehicle_id,
                distance = delta.distance,
                took_ms = took_ms(start),
                "aggregate distance"
            ),
            Err(e) => warn!(
                component = self.component,
                obu_id = delta.vehicle_id,
                distance = delta.distance,
                took_ms = took_ms(start),
                kind = e.kind(),
                error = %e,
                "aggregate distance failed"
            ),
        }
        result
    }

    async fn calculate_invoice(&self, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        let start = Instant::now();

        let result = self.inner.calculate_invoice(vehicle_id).await;

        match &result {
            Ok(invoice) => info!(
                component = self.component,
                obu_id = vehicle_id,
                total_distance = invoice.total_distance,
                total_amount = invoice.total_amount,
                took_ms = took_ms(start),
                "calculate invoice"
            ),
            Err(e) => warn!(
                component = self.component,
                obu_id = vehicle_id,
                took_ms = took_ms(start),
                kind = e.kind(),
                error = %e,
                "calculate invoice failed"
            ),
        }
        result
    }
}

#[async_trait]
impl<T: Calculator> Calculator for Logged<T> {
    async fn ingest(
        &self,
        ctx: &CallContext,
        reading: TelemetryReading,
    ) -> Result<Option<DistanceDelta>> {
        let start = Instant::now();

        let result = self.inner.ingest(ctx, reading).await;

        match &result {
            Ok(delta) => info!(
                component = self.component,
                obu_id = reading.vehicle_id,
                lat = reading.latitude,
                long = reading.longitude,
                distance = delta.map(|d| d.distance),
                took_ms = took_ms(start),
                "ingest reading"
            ),
            Err(e) => warn!(
                component = self.component,
                obu_id = reading.vehicle_id,
                lat = reading.latitude,
                long = reading.longitude,
                took_ms = took_ms(start),
                kind = e.kind(),
                error = %e,
                "ingest reading failed"
            ),
        }
        result
    }
}
