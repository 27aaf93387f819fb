//! Domain types shared by the aggregator, the calculator and both transports.
//!
//! JSON field names follow the ingestion feed's wire format (`obuID`, `unix`, ...).

use serde::{Deserialize, Serialize};

use crate::proto;

/// A positional ping from a vehicle's on-board unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    #[serde(rename = "obuID")]
    pub vehicle_id: i64,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "long")]
    pub longitude: f64,
    #[serde(rename = "unix")]
    pub timestamp_nanos: i64,
}

impl TelemetryReading {
    pub fn new(vehicle_id: i64, latitude: f64, longitude: f64, timestamp_nanos: i64) -> Self {
        Self {
            vehicle_id,
            latitude,
            longitude,
            timestamp_nanos,
        }
    }
}

/// Billable distance derived from two consecutive readings of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceDelta {
    #[serde(rename = "obuID")]
    pub vehicle_id: i64,
    #[serde(rename = "value")]
    pub distance: f64,
    #[serde(rename = "unix")]
    pub timestamp_nanos: i64,
}

impl DistanceDelta {
    pub fn new(vehicle_id: i64, distance: f64, timestamp_nanos: i64) -> Self {
        Self {
            vehicle_id,
            distance,
            timestamp_nanos,
        }
    }
}

/// Read-only copy of a vehicle's invoice at the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    #[serde(rename = "obuID")]
    pub vehicle_id: i64,
    #[serde(rename = "totalDistance")]
    pub total_distance: f64,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
}

impl From<DistanceDelta> for proto::AggregateRequest {
    fn from(delta: DistanceDelta) -> Self {
        Self {
            obu_id: delta.vehicle_id,
            value: delta.distance,
            unix: delta.timestamp_nanos,
        }
    }
}

impl From<proto::AggregateRequest> for DistanceDelta {
    fn from(req: proto::AggregateRequest) -> Self {
        Self {
            vehicle_id: req.obu_id,
            distance: req.value,
            timestamp_nanos: req.unix,
        }
    }
}

impl From<InvoiceSnapshot> for proto::Invoice {
    fn from(inv: InvoiceSnapshot) -> Self {
        Self {
            obu_id: inv.vehicle_id,
            total_distance: inv.total_distance,
            total_amount: inv.total_amount,
        }
    }
}

impl From<proto::Invoice> for InvoiceSnapshot {
    fn from(inv: proto::Invoice) -> Self {
        Self {
            vehicle_id: inv.obu_id,
            total_distance: inv.total_distance,
            total_amount: inv.total_amount,
        }
    }
}
