//! gRPC-backed [`InvoiceClient`] using tonic.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use tracing::debug;

use crate::context::CallContext;
use crate::error::{BillingError, Result};
use crate::proto::aggregator_client::AggregatorClient;
use crate::proto::{AggregateRequest, GetInvoiceRequest};
use crate::traits::InvoiceClient;
use crate::types::InvoiceSnapshot;

/// Normalize `host:port` into a URI tonic accepts.
fn endpoint_uri(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// Connect to an aggregator gRPC endpoint.
pub async fn connect_channel(address: &str) -> Result<Channel> {
    Endpoint::from_shared(endpoint_uri(address))
        .map_err(|e| BillingError::transport(format!("invalid URI {address}: {e}")))?
        .connect()
        .await
        .map_err(|e| BillingError::transport(format!("connection to {address} failed: {e}")))
}

/// Invoice client speaking the `toll.Aggregator` gRPC service.
#[derive(Clone)]
pub struct GrpcInvoiceClient {
    inner: AggregatorClient<Channel>,
}

impl GrpcInvoiceClient {
    /// Connect eagerly to `address` (`host:port` or a full URI).
    pub async fn connect(address: &str) -> Result<Self> {
        let channel = connect_channel(address).await?;
        debug!(address, "connected to aggregator over gRPC");
        Ok(Self::from_channel(channel))
    }

    /// Create a client from an existing channel.
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: AggregatorClient::new(channel),
        }
    }

    fn request<T>(ctx: &CallContext, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(remaining) = ctx.remaining() {
            request.set_timeout(remaining);
        }
        request
    }
}

#[async_trait]
impl InvoiceClient for GrpcInvoiceClient {
    async fn aggregate(&self, ctx: &CallContext, request: AggregateRequest) -> Result<()> {
        let vehicle_id = request.obu_id;
        let mut client = self.inner.clone();
        let request = Self::request(ctx, request);
        ctx.run(async move {
            client
                .aggregate(request)
                .await
                .map(|_| ())
                .map_err(|status| BillingError::from_status(&status, vehicle_id))
        })
        .await
    }

    async fn get_invoice(&self, ctx: &CallContext, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        let mut client = self.inner.clone();
        let request = Self::request(ctx, GetInvoiceRequest { obu_id: vehicle_id });
        ctx.run(async move {
            client
                .get_invoice(request)
                .await
                .map(|response| InvoiceSnapshot::from(response.into_inner()))
                .map_err(|status| BillingError::from_status(&status, vehicle_id))
        })
        .await
    }
}
