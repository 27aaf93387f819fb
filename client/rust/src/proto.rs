//! Wire messages for the `toll.Aggregator` gRPC service.
//!
//! Field numbers are part of the wire contract; do not renumber.

/// A distance delta submitted for aggregation.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AggregateRequest {
    #[prost(int64, tag = "1")]
    pub obu_id: i64,
    /// Billable distance in kilometres.
    #[prost(double, tag = "2")]
    pub value: f64,
    /// Timestamp of the reading that closed the delta, in nanoseconds.
    #[prost(int64, tag = "3")]
    pub unix: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInvoiceRequest {
    #[prost(int64, tag = "1")]
    pub obu_id: i64,
}

/// Point-in-time invoice totals for one vehicle.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Invoice {
    #[prost(int64, tag = "1")]
    pub obu_id: i64,
    #[prost(double, tag = "2")]
    pub total_distance: f64,
    #[prost(double, tag = "3")]
    pub total_amount: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Empty {}

include!(concat!(env!("OUT_DIR"), "/toll.Aggregator.rs"));
