//! Core bookkeeping types, VAT calculation, classification, and invoicing.
//!
//! Nothing in this module does I/O or keeps shared state. The only
//! randomness is the invoice-id suffix drawn in [`InvoiceIdGenerator`].
//! Persistence lives in [`crate::ledger`].

mod builder;
mod calculator;
mod classifier;
mod error;
mod numbering;
mod types;
mod validation;

pub use builder::*;
pub use calculator::*;
pub use classifier::*;
pub use error::*;
pub use numbering::*;
pub use types::*;
pub use validation::*;
