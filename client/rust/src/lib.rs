//! Client library for the toll invoice aggregator.
//!
//! Provides the wire types, the shared error taxonomy and the
//! transport-agnostic [`InvoiceClient`] trait with gRPC and HTTP
//! implementations.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use toll_client::{CallContext, GrpcInvoiceClient, InvoiceClient};
//! use std::time::Duration;
//!
//! async fn example() -> toll_client::Result<()> {
//!     let client = GrpcInvoiceClient::connect("localhost:3001").await?;
//!     let ctx = CallContext::with_timeout(Duration::from_secs(2));
//!     let invoice = client.get_invoice(&ctx, 1).await?;
//!     println!("{} km, {} due", invoice.total_distance, invoice.total_amount);
//!     Ok(())
//! }
//! ```
//!
//! # Mocking for Tests
//!
//! Implement [`InvoiceClient`] directly; both methods take the call context so
//! mocks can observe deadlines too.

pub mod context;
pub mod error;
pub mod grpc;
pub mod proto;
pub mod rest;
pub mod traits;
pub mod types;

pub use context::CallContext;
pub use error::{BillingError, Result};
pub use grpc::GrpcInvoiceClient;
pub use rest::HttpInvoiceClient;
pub use traits::InvoiceClient;
pub use types::{DistanceDelta, InvoiceSnapshot, TelemetryReading};
