//! Client abstraction over the invoice aggregator.
//!
//! The gRPC and HTTP clients (and the in-process client in the server crate)
//! implement the same trait, so the distance calculator never knows which
//! transport carries its deltas.

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::Result;
use crate::proto::AggregateRequest;
use crate::types::InvoiceSnapshot;

/// Submit distance deltas and fetch invoices from an aggregator.
///
/// Implementations map every transport failure into [`crate::BillingError`] and
/// honour the context's cancellation and deadline.
#[async_trait]
pub trait InvoiceClient: Send + Sync {
    /// Submit one distance delta. Returns once the aggregator has applied it.
    async fn aggregate(&self, ctx: &CallContext, request: AggregateRequest) -> Result<()>;

    /// Fetch the current invoice for a vehicle.
    async fn get_invoice(&self, ctx: &CallContext, vehicle_id: i64) -> Result<InvoiceSnapshot>;
}
