//! Business services: invoice aggregation and distance calculation.

pub mod aggregator;
pub mod calculator;

pub use aggregator::{Aggregator, InvoiceAggregator};
pub use calculator::{Calculator, DistanceCalculator};
