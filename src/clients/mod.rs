//! Invoice client implementations that live in the server crate.
//!
//! The network clients (gRPC, HTTP) come from `toll-client`; this module adds
//! the in-process client used when calculator and aggregator share a process,
//! and a scriptable mock for tests.

pub mod local;
pub mod mock;

pub use local::LocalInvoiceClient;
pub use mock::MockInvoiceClient;
pub use toll_client::{GrpcInvoiceClient, HttpInvoiceClient, InvoiceClient};
