//! Per-shard consumption loop.

use std::sync::Arc;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::services::Calculator;
use toll_client::{BillingError, CallContext, DistanceDelta, Result, TelemetryReading};

/// Redelivery policy for readings whose forward failed transiently.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Redeliveries after the first attempt.
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Deadline for each individual attempt.
    pub request_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            request_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> impl Iterator<Item = Duration> {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
            .with_jitter()
            .build()
    }

    fn context(&self, shutdown: &CancellationToken) -> CallContext {
        let ctx = match self.request_timeout {
            Some(timeout) => CallContext::with_timeout(timeout),
            None => CallContext::background(),
        };
        ctx.with_token(shutdown.child_token())
    }
}

/// Counters reported by a consumer loop when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Readings taken off the shard.
    pub processed: usize,
    /// Deltas forwarded to the aggregator.
    pub emitted: usize,
    /// Readings given up on (invalid, or retries exhausted).
    pub dropped: usize,
}

impl std::ops::AddAssign for ConsumerStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.emitted += other.emitted;
        self.dropped += other.dropped;
    }
}

/// Consume one shard until its channel closes or `shutdown` fires.
pub async fn run_consumer(
    shard: usize,
    mut rx: mpsc::Receiver<TelemetryReading>,
    calculator: Arc<dyn Calculator>,
    policy: RetryPolicy,
    shutdown: CancellationToken,
) -> ConsumerStats {
    let mut stats = ConsumerStats::default();

    loop {
        let reading = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            reading = rx.recv() => match reading {
                Some(reading) => reading,
                None => break,
            },
        };
        stats.processed += 1;

        match deliver(calculator.as_ref(), reading, &policy, &shutdown).await {
            Ok(Some(_)) => stats.emitted += 1,
            Ok(None) => {}
            Err(BillingError::Cancelled) => break,
            Err(e) if e.is_validation() => {
                stats.dropped += 1;
                warn!(shard, obu_id = reading.vehicle_id, error = %e, "dropping invalid reading");
            }
            Err(e) => {
                stats.dropped += 1;
                error!(shard, obu_id = reading.vehicle_id, kind = e.kind(), error = %e, "dropping reading");
            }
        }
    }

    debug!(
        shard,
        processed = stats.processed,
        emitted = stats.emitted,
        dropped = stats.dropped,
        "consumer stopped"
    );
    stats
}

/// Hand a reading to the calculator, redelivering it on retryable failures.
///
/// The calculator leaves its baseline untouched when a forward fails, so each
/// redelivery recomputes the same delta.
async fn deliver(
    calculator: &dyn Calculator,
    reading: TelemetryReading,
    policy: &RetryPolicy,
    shutdown: &CancellationToken,
) -> Result<Option<DistanceDelta>> {
    let mut last_error = None;

    for (attempt, delay) in std::iter::once(Duration::ZERO)
        .chain(policy.backoff())
        .enumerate()
    {
        if attempt > 0 {
            tokio::select! {
                _ = shutdown.cancelled() => return Err(BillingError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let ctx = policy.context(shutdown);
        match calculator.ingest(&ctx, reading).await {
            Ok(delta) => return Ok(delta),
            Err(e) if e.is_retryable() => {
                warn!(
                    obu_id = reading.vehicle_id,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    error = %e,
                    "forward failed, redelivering"
                );
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| BillingError::internal("redelivery exhausted")))
}
