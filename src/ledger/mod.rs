//! Persistence, daily metrics, and the sale pipeline.
//!
//! Invoices are the source of truth. Daily metrics are a derived aggregate
//! that [`reconcile`] can check and rebuild from the invoice log.

mod aggregator;
mod config;
mod memory;
mod metrics;
mod pipeline;
mod replay;
mod report;
mod store;

pub use aggregator::*;
pub use config::*;
pub use memory::*;
pub use metrics::*;
pub use pipeline::*;
pub use replay::*;
pub use report::*;
pub use store::*;
