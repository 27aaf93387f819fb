//! Toll calculator - road-usage billing.
//!
//! Converts on-board-unit telemetry into distance deltas, accumulates them
//! into per-vehicle invoices, and serves those invoices over gRPC and HTTP.
//!
//! ```text
//! [telemetry feed] -> [ingest shards] -> [DistanceCalculator]
//!                                              |
//!                                              v  InvoiceClient (gRPC | HTTP | local)
//!                     [gRPC binding] --+-> [InvoiceAggregator] -> [InvoiceStore]
//!                     [HTTP binding] --+
//! ```

pub mod advice;
pub mod clients;
pub mod config;
pub mod ingest;
pub mod services;
pub mod storage;
pub mod transport;
pub mod utils;

pub use toll_client::{
    proto, BillingError, CallContext, DistanceDelta, InvoiceSnapshot, Result, TelemetryReading,
};
