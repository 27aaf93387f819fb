//! Invoice aggregator: the business facade over the invoice store.
//!
//! Transports call only this layer. It validates input and delegates to the
//! store; logging and metrics are added by wrapping it (see `crate::advice`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::storage::InvoiceStore;
use toll_client::{BillingError, DistanceDelta, InvoiceSnapshot, Result};

/// Operations the transports expose.
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Validate a delta and add it to its vehicle's invoice.
    async fn aggregate_distance(&self, delta: DistanceDelta) -> Result<()>;

    /// Current invoice for a vehicle; `NotFound` if it has none.
    async fn calculate_invoice(&self, vehicle_id: i64) -> Result<InvoiceSnapshot>;
}

#[async_trait]
impl<T: Aggregator + ?Sized> Aggregator for Arc<T> {
    async fn aggregate_distance(&self, delta: DistanceDelta) -> Result<()> {
        (**self).aggregate_distance(delta).await
    }

    async fn calculate_invoice(&self, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        (**self).calculate_invoice(vehicle_id).await
    }
}

#[async_trait]
impl<T: Aggregator + ?Sized> Aggregator for Box<T> {
    async fn aggregate_distance(&self, delta: DistanceDelta) -> Result<()> {
        (**self).aggregate_distance(delta).await
    }

    async fn calculate_invoice(&self, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        (**self).calculate_invoice(vehicle_id).await
    }
}

pub(crate) fn check_vehicle_id(vehicle_id: i64) -> Result<()> {
    if vehicle_id <= 0 {
        return Err(BillingError::validation(format!(
            "obu id must be positive, got {vehicle_id}"
        )));
    }
    Ok(())
}

/// Validating aggregator over an injected store.
pub struct InvoiceAggregator {
    store: Arc<dyn InvoiceStore>,
}

impl InvoiceAggregator {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }
}

#[async_trait]
impl Aggregator for InvoiceAggregator {
    async fn aggregate_distance(&self, delta: DistanceDelta) -> Result<()> {
        check_vehicle_id(delta.vehicle_id)?;
        if !delta.distance.is_finite() || delta.distance < 0.0 {
            return Err(BillingError::validation(format!(
                "distance must be a non-negative number, got {}",
                delta.distance
            )));
        }
        self.store.accumulate(delta.vehicle_id, delta.distance).await
    }

    async fn calculate_invoice(&self, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        check_vehicle_id(vehicle_id)?;
        self.store.snapshot(vehicle_id).await
    }
}
