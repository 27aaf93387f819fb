//! Invoice state storage.
//!
//! The store is the sole owner of every [`InvoiceState`]; everything else sees
//! value copies ([`InvoiceSnapshot`]).

mod invoice_store;
pub mod memory;

pub use invoice_store::{InvoiceState, InvoiceStore};
pub use memory::MemoryStore;

pub use toll_client::{BillingError, InvoiceSnapshot, Result};
