//! Process bootstrap helpers shared by the binaries.

pub mod bootstrap;
pub mod metrics;
