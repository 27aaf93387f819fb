//! Keyed fan-out of readings onto per-shard channels.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::feed::TelemetryFeed;
use toll_client::{BillingError, Result, TelemetryReading};

/// Routes each reading to the shard owning its vehicle.
///
/// A vehicle always maps to the same shard, so its readings are consumed in
/// feed order by a single loop, like a keyed partition of a topic.
pub struct ShardRouter {
    senders: Vec<mpsc::Sender<TelemetryReading>>,
}

impl ShardRouter {
    /// Create `shards` bounded channels (at least one).
    pub fn new(
        shards: usize,
        capacity: usize,
    ) -> (Self, Vec<mpsc::Receiver<TelemetryReading>>) {
        let (senders, receivers) = (0..shards.max(1))
            .map(|_| mpsc::channel(capacity.max(1)))
            .unzip();
        (Self { senders }, receivers)
    }

    pub fn shards(&self) -> usize {
        self.senders.len()
    }

    /// Shard index for a vehicle.
    pub fn shard_for(&self, vehicle_id: i64) -> usize {
        vehicle_id.rem_euclid(self.senders.len() as i64) as usize
    }

    /// Enqueue a reading, waiting while its shard is full.
    pub async fn route(&self, reading: TelemetryReading) -> Result<()> {
        let shard = self.shard_for(reading.vehicle_id);
        self.senders[shard]
            .send(reading)
            .await
            .map_err(|_| BillingError::internal(format!("shard {shard} consumer stopped")))
    }

    /// Drain `feed` into the shards until it ends or `shutdown` fires.
    ///
    /// Bad records are logged and skipped. Consumes the router, so the shard
    /// channels close when this returns. Returns the number of routed readings.
    pub async fn pump<F: TelemetryFeed>(self, mut feed: F, shutdown: CancellationToken) -> usize {
        let mut routed = 0;
        loop {
            let item = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                item = feed.next() => item,
            };
            match item {
                None => break,
                Some(Err(e)) => warn!(kind = e.kind(), error = %e, "skipping telemetry record"),
                Some(Ok(reading)) => {
                    if let Err(e) = self.route(reading).await {
                        warn!(error = %e, "stopping feed");
                        break;
                    }
                    routed += 1;
                }
            }
        }
        debug!(routed, "telemetry feed drained");
        routed
    }
}
