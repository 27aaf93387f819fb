//! In-memory invoice store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use super::invoice_store::check_distance;
use super::{BillingError, InvoiceSnapshot, InvoiceState, InvoiceStore, Result};

fn poisoned<T>(_: PoisonError<T>) -> BillingError {
    BillingError::internal("invoice store lock poisoned")
}

/// Invoice store keyed by vehicle id.
///
/// The outer map lock is held exclusively only while a vehicle's first delta
/// is inserted; later deltas lock just that vehicle's entry, so different
/// vehicles never contend.
pub struct MemoryStore {
    rate: f64,
    invoices: RwLock<HashMap<i64, Arc<Mutex<InvoiceState>>>>,
}

impl MemoryStore {
    /// Create an empty store billing `rate` per unit distance.
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            invoices: RwLock::new(HashMap::new()),
        }
    }

    fn entry(&self, vehicle_id: i64) -> Result<Option<Arc<Mutex<InvoiceState>>>> {
        let invoices = self.invoices.read().map_err(poisoned)?;
        Ok(invoices.get(&vehicle_id).cloned())
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn accumulate(&self, vehicle_id: i64, distance: f64) -> Result<()> {
        check_distance(distance)?;

        let slot = match self.entry(vehicle_id)? {
            Some(slot) => slot,
            None => {
                let mut invoices = self.invoices.write().map_err(poisoned)?;
                match invoices.entry(vehicle_id) {
                    Entry::Occupied(occupied) => Arc::clone(occupied.get()),
                    Entry::Vacant(vacant) => {
                        // First delta is applied before the entry becomes visible.
                        let mut state = InvoiceState::new(vehicle_id);
                        state.apply(distance, self.rate);
                        vacant.insert(Arc::new(Mutex::new(state)));
                        debug!(obu_id = vehicle_id, "invoice created");
                        return Ok(());
                    }
                }
            }
        };

        let mut state = slot.lock().map_err(poisoned)?;
        state.apply(distance, self.rate);
        Ok(())
    }

    async fn snapshot(&self, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        let slot = self
            .entry(vehicle_id)?
            .ok_or(BillingError::NotFound(vehicle_id))?;
        let state = slot.lock().map_err(poisoned)?;
        Ok(state.snapshot())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.invoices.read().map_err(poisoned)?.len())
    }

    fn rate(&self) -> f64 {
        self.rate
    }
}
