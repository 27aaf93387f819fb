//! gRPC binding for the invoice aggregator.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use crate::services::Aggregator;
use toll_client::proto::aggregator_server::{self, AggregatorServer};
use toll_client::proto::{AggregateRequest, Empty, GetInvoiceRequest, Invoice};
use toll_client::DistanceDelta;

/// `toll.Aggregator` service implementation.
///
/// Holds no state of its own; every call goes to the shared aggregator, so
/// the HTTP binding observes the same invoices.
#[derive(Clone)]
pub struct AggregatorGrpc {
    aggregator: Arc<dyn Aggregator>,
}

impl AggregatorGrpc {
    pub fn new(aggregator: Arc<dyn Aggregator>) -> Self {
        Self { aggregator }
    }

    /// Wrap into the generated tonic server.
    pub fn into_server(self) -> AggregatorServer<Self> {
        AggregatorServer::new(self)
    }
}

#[tonic::async_trait]
impl aggregator_server::Aggregator for AggregatorGrpc {
    async fn aggregate(
        &self,
        request: Request<AggregateRequest>,
    ) -> Result<Response<Empty>, Status> {
        let delta = DistanceDelta::from(request.into_inner());
        debug!(obu_id = delta.vehicle_id, "gRPC aggregate");

        self.aggregator.aggregate_distance(delta).await?;
        Ok(Response::new(Empty {}))
    }

    async fn get_invoice(
        &self,
        request: Request<GetInvoiceRequest>,
    ) -> Result<Response<Invoice>, Status> {
        let obu_id = request.into_inner().obu_id;
        debug!(obu_id, "gRPC get invoice");

        let invoice = self.aggregator.calculate_invoice(obu_id).await?;
        Ok(Response::new(invoice.into()))
    }
}
