//! HTTP-backed [`InvoiceClient`] using reqwest.
//!
//! Talks to the aggregator's REST binding:
//! - `POST {base}/aggregate` with a JSON distance delta
//! - `GET {base}/invoice?obu=<id>`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::context::CallContext;
use crate::error::{BillingError, Result};
use crate::proto::AggregateRequest;
use crate::traits::InvoiceClient;
use crate::types::{DistanceDelta, InvoiceSnapshot};

/// Default per-request timeout when the context carries no deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the REST binding.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Invoice client speaking the aggregator's HTTP/JSON binding.
#[derive(Clone)]
pub struct HttpInvoiceClient {
    client: Client,
    base_url: String,
}

impl HttpInvoiceClient {
    /// Create a client for the aggregator at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit fallback timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BillingError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-2xx response into the matching error kind.
    async fn error_from(response: Response, vehicle_id: i64) -> BillingError {
        let status = response.status();
        let message = match response.text().await {
            Ok(text) => serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text),
            Err(e) => e.to_string(),
        };
        BillingError::from_http(status, message, vehicle_id)
    }
}

#[async_trait]
impl InvoiceClient for HttpInvoiceClient {
    async fn aggregate(&self, ctx: &CallContext, request: AggregateRequest) -> Result<()> {
        let delta = DistanceDelta::from(request);
        let mut builder = self
            .client
            .post(format!("{}/aggregate", self.base_url))
            .json(&delta);
        if let Some(remaining) = ctx.remaining() {
            builder = builder.timeout(remaining);
        }

        ctx.run(async move {
            let response = builder.send().await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(Self::error_from(response, delta.vehicle_id).await)
            }
        })
        .await
    }

    async fn get_invoice(&self, ctx: &CallContext, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        let mut builder = self
            .client
            .get(format!("{}/invoice", self.base_url))
            .query(&[("obu", vehicle_id)]);
        if let Some(remaining) = ctx.remaining() {
            builder = builder.timeout(remaining);
        }

        ctx.run(async move {
            let response = builder.send().await?;
            if !response.status().is_success() {
                return Err(Self::error_from(response, vehicle_id).await);
            }
            let body = response.bytes().await?;
            serde_json::from_slice::<InvoiceSnapshot>(&body)
                .map_err(|e| BillingError::transport(format!("malformed response: {e}")))
        })
        .await
    }
}
