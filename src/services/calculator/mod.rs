//! Distance calculator: turns positional telemetry into billable deltas.
//!
//! Keeps exactly one prior reading per vehicle. Each new reading closes a
//! delta against it, which is forwarded to the aggregator through an
//! [`InvoiceClient`]; the baseline only advances once the forward succeeded,
//! so a redelivered reading recomputes the same delta.

pub mod geo;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::services::aggregator::check_vehicle_id;
use toll_client::{
    BillingError, CallContext, DistanceDelta, InvoiceClient, Result, TelemetryReading,
};

/// Ingestion operation, wrapped by the logging/metrics advice.
#[async_trait]
pub trait Calculator: Send + Sync {
    /// Process one reading. Returns the delta that was forwarded, if any.
    async fn ingest(
        &self,
        ctx: &CallContext,
        reading: TelemetryReading,
    ) -> Result<Option<DistanceDelta>>;
}

#[async_trait]
impl<T: Calculator + ?Sized> Calculator for Arc<T> {
    async fn ingest(
        &self,
        ctx: &CallContext,
        reading: TelemetryReading,
    ) -> Result<Option<DistanceDelta>> {
        (**self).ingest(ctx, reading).await
    }
}

#[async_trait]
impl<T: Calculator + ?Sized> Calculator for Box<T> {
    async fn ingest(
        &self,
        ctx: &CallContext,
        reading: TelemetryReading,
    ) -> Result<Option<DistanceDelta>> {
        (**self).ingest(ctx, reading).await
    }
}

/// Last accepted reading for one vehicle.
type Baseline = Arc<Mutex<Option<TelemetryReading>>>;

/// Calculator forwarding deltas through any [`InvoiceClient`].
///
/// A vehicle's baseline lock is held across its forward call, so readings of
/// one vehicle are processed one at a time; other vehicles are unaffected.
pub struct DistanceCalculator {
    client: Arc<dyn InvoiceClient>,
    baselines: RwLock<HashMap<i64, Baseline>>,
}

impl DistanceCalculator {
    pub fn new(client: Arc<dyn InvoiceClient>) -> Self {
        Self {
            client,
            baselines: RwLock::new(HashMap::new()),
        }
    }

    /// Number of vehicles with a baseline reading.
    pub fn tracked_vehicles(&self) -> Result<usize> {
        Ok(self.baselines.read().map_err(poisoned)?.len())
    }

    /// The vehicle's current baseline, if one was recorded.
    pub async fn last_reading(&self, vehicle_id: i64) -> Result<Option<TelemetryReading>> {
        let slot = self
            .baselines
            .read()
            .map_err(poisoned)?
            .get(&vehicle_id)
            .cloned();
        match slot {
            Some(slot) => Ok(*slot.lock().await),
            None => Ok(None),
        }
    }

    fn baseline(&self, vehicle_id: i64) -> Result<Baseline> {
        if let Some(slot) = self.baselines.read().map_err(poisoned)?.get(&vehicle_id) {
            return Ok(Arc::clone(slot));
        }
        let mut baselines = self.baselines.write().map_err(poisoned)?;
        Ok(Arc::clone(baselines.entry(vehicle_id).or_default()))
    }
}

fn poisoned<T>(_: PoisonError<T>) -> BillingError {
    BillingError::internal("calculator baseline map poisoned")
}

fn check_reading(reading: &TelemetryReading) -> Result<()> {
    check_vehicle_id(reading.vehicle_id)?;
    if !geo::is_valid_position(reading) {
        return Err(BillingError::validation(format!(
            "invalid position ({}, {}) for obu {}",
            reading.latitude, reading.longitude, reading.vehicle_id
        )));
    }
    Ok(())
}

#[async_trait]
impl Calculator for DistanceCalculator {
    async fn ingest(
        &self,
        ctx: &CallContext,
        reading: TelemetryReading,
    ) -> Result<Option<DistanceDelta>> {
        check_reading(&reading)?;

        let slot = self.baseline(reading.vehicle_id)?;
        let mut last = slot.lock().await;

        let Some(prev) = *last else {
            *last = Some(reading);
            return Ok(None);
        };

        if reading.timestamp_nanos <= prev.timestamp_nanos {
            debug!(
                obu_id = reading.vehicle_id,
                prev = prev.timestamp_nanos,
                next = reading.timestamp_nanos,
                "non-increasing timestamp, no delta emitted"
            );
            *last = Some(reading);
            return Ok(None);
        }

        let distance = geo::distance_between(&prev, &reading);
        if distance <= 0.0 {
            *last = Some(reading);
            return Ok(None);
        }

        let delta = DistanceDelta::new(reading.vehicle_id, distance, reading.timestamp_nanos);
        self.client.aggregate(ctx, delta.into()).await?;

        *last = Some(reading);
        Ok(Some(delta))
    }
}
