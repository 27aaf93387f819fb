//! Aspect-oriented advice for cross-cutting concerns.
//!
//! This module provides wrapper types that add orthogonal behavior
//! (logging, metrics) without polluting core business logic.
//!
//! # Architecture
//!
//! Advice is applied at service composition time, not in implementations:
//!
//! ```ignore
//! // Core implementation - pure business logic
//! let aggregator = InvoiceAggregator::new(store);
//!
//! // Apply advice layers, innermost first
//! let aggregator = Logged::new(Instrumented::new(aggregator, "aggregator"), "aggregator");
//!
//! // Use as normal - logging and metrics are transparent
//! aggregator.aggregate_distance(delta).await?;
//! ```
//!
//! Every wrapper calls the next layer exactly once and returns its result
//! untouched, errors included.
//!
//! # Available Advice
//!
//! - [`Logged`] - Structured `tracing` events with latency and outcome
//! - [`Instrumented`] - Adds metrics (counters, histograms) for all operations

mod instrumented;
mod logged;

pub use instrumented::Instrumented;
pub use logged::Logged;

use std::sync::Arc;

use crate::services::{Aggregator, Calculator, DistanceCalculator, InvoiceAggregator};

/// Standard aggregator chain: logging outside metrics outside business logic.
pub fn decorate_aggregator(inner: InvoiceAggregator) -> Arc<dyn Aggregator> {
    Arc::new(Logged::new(
        Instrumented::new(inner, "aggregator"),
        "aggregator",
    ))
}

/// Standard calculator chain: logging outside metrics outside business logic.
pub fn decorate_calculator(inner: DistanceCalculator) -> Arc<dyn Calculator> {
    Arc::new(Logged::new(
        Instrumented::new(inner, "calculator"),
        "calculator",
    ))
}
