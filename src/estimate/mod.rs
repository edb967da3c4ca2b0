//! Advisory annual tax estimate: income tax, trade tax, solidarity
//! surcharge and VAT due, plus an annual report with recommendations.
//!
//! These figures are for orientation only and never feed invoices.

mod annual;
mod estimator;

pub use annual::*;
pub use estimator::*;
