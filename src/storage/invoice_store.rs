//! InvoiceStore trait definition.

use async_trait::async_trait;

use super::{BillingError, InvoiceSnapshot, Result};

/// Running totals for one vehicle.
///
/// `amount == distance * rate` holds after every [`InvoiceState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceState {
    pub vehicle_id: i64,
    pub distance: f64,
    pub amount: f64,
}

impl InvoiceState {
    pub fn new(vehicle_id: i64) -> Self {
        Self {
            vehicle_id,
            distance: 0.0,
            amount: 0.0,
        }
    }

    /// Add `distance` and recompute the amount from the full total.
    pub fn apply(&mut self, distance: f64, rate: f64) {
        self.distance += distance;
        self.amount = self.distance * rate;
    }

    pub fn snapshot(&self) -> InvoiceSnapshot {
        InvoiceSnapshot {
            vehicle_id: self.vehicle_id,
            total_distance: self.distance,
            total_amount: self.amount,
        }
    }
}

/// Reject distances that cannot be accumulated.
pub(crate) fn check_distance(distance: f64) -> Result<()> {
    if !distance.is_finite() {
        return Err(BillingError::validation(format!(
            "distance must be finite, got {distance}"
        )));
    }
    if distance < 0.0 {
        return Err(BillingError::validation(format!(
            "distance must be non-negative, got {distance}"
        )));
    }
    Ok(())
}

/// Interface for invoice accumulation.
///
/// # Requirements
///
/// - `accumulate` is one atomic read-modify-write; no reader may observe a
///   partially applied delta.
/// - Accumulation is order-independent: any interleaving of the same deltas
///   yields the same total distance.
/// - No lock is held across an `.await`.
///
/// # Implementations
///
/// - `MemoryStore`: in-process map with per-vehicle locks
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Add `distance` to the vehicle's invoice, creating it on first use.
    ///
    /// Negative or non-finite distances are rejected with `Validation`.
    async fn accumulate(&self, vehicle_id: i64, distance: f64) -> Result<()>;

    /// Copy out the vehicle's current totals.
    ///
    /// Returns `NotFound` if nothing was ever accumulated for it.
    async fn snapshot(&self, vehicle_id: i64) -> Result<InvoiceSnapshot>;

    /// Number of vehicles with invoice state.
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Price per unit distance this store bills at.
    fn rate(&self) -> f64;
}
