//! Mock invoice client for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use toll_client::proto::AggregateRequest;
use toll_client::{BillingError, CallContext, InvoiceClient, InvoiceSnapshot, Result};

/// Records every accepted request and can be scripted to fail.
#[derive(Default)]
pub struct MockInvoiceClient {
    received: RwLock<Vec<AggregateRequest>>,
    fail_with: RwLock<Option<BillingError>>,
    failures_left: RwLock<usize>,
    attempts: RwLock<usize>,
}

impl MockInvoiceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call with `err` until cleared.
    pub async fn set_fail_with(&self, err: Option<BillingError>) {
        *self.fail_with.write().await = err;
        *self.failures_left.write().await = usize::MAX;
    }

    /// Fail the next `times` calls with `err`, then succeed.
    pub async fn fail_times(&self, times: usize, err: BillingError) {
        *self.fail_with.write().await = Some(err);
        *self.failures_left.write().await = times;
    }

    /// Requests that were accepted, in arrival order.
    pub async fn received(&self) -> Vec<AggregateRequest> {
        self.received.read().await.clone()
    }

    /// Calls made to `aggregate`, including failed ones.
    pub async fn attempts(&self) -> usize {
        *self.attempts.read().await
    }

    async fn scripted_failure(&self) -> Option<BillingError> {
        let mut left = self.failures_left.write().await;
        if *left == 0 {
            return None;
        }
        let err = self.fail_with.read().await.clone()?;
        *left = left.saturating_sub(1);
        Some(err)
    }
}

#[async_trait]
impl InvoiceClient for MockInvoiceClient {
    async fn aggregate(&self, ctx: &CallContext, request: AggregateRequest) -> Result<()> {
        *self.attempts.write().await += 1;
        if ctx.is_cancelled() {
            return Err(BillingError::Cancelled);
        }
        if let Some(err) = self.scripted_failure().await {
            return Err(err);
        }
        self.received.write().await.push(request);
        Ok(())
    }

    async fn get_invoice(&self, _ctx: &CallContext, vehicle_id: i64) -> Result<InvoiceSnapshot> {
        let received = self.received.read().await;
        let mut matching = received.iter().filter(|r| r.obu_id == vehicle_id).peekable();
        if matching.peek().is_none() {
            return Err(BillingError::NotFound(vehicle_id));
        }
        let total_distance = matching.map(|r| r.value).sum();
        Ok(InvoiceSnapshot {
            vehicle_id,
            total_distance,
            total_amount: 0.0,
        })
    }
}
