//! In-process invoice client.

use async_trait::async_trait;

use crate::services::Aggregator;
use toll_client::proto::AggregateRequest;
use toll_client::{CallContext, DistanceDelta, InvoiceClient, InvoiceSnapshot, Result};

/// Calls an [`Aggregator`] directly, honouring the context like the network
/// clients do.
pub struct LocalInvoiceClient<A> {
    aggregator: A,
}

impl<A: Aggregator> LocalInvoiceClient<A> {
    pub fn new(aggregator: A) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl<A: Aggregator> InvoiceClient for LocalInvoiceClient<A> {
    async fn aggregate(&self, ctx: &CallContext, request: AggregateRequest) -> Result<()> {
        ctx.run(self.aggregator.aggregate_distance(DistanceDelta::from(request)))
            .await
    }

    async fn get_invoice(&self, ctx: &CallContext, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        ctx.run(self.aggregator.calculate_invoice(vehicle_id)).await
    }
}
