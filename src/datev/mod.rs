//! DATEV Buchungsstapel EXTF CSV export of issued invoices.
//!
//! One gross posting per invoice against the debitor (income) or creditor
//! (expense) account, with SKR03/SKR04 contra accounts.
//!
//! # Example
//!
//! ```ignore
//! use steuerbuch::datev::*;
//!
//! let config = DatevConfigBuilder::new(12345, 99999)
//!     .chart(ChartOfAccounts::SKR03)
//!     .build();
//! let csv = to_extf(&invoices, &config)?;
//! ```

mod accounts;
mod extf;

pub use accounts::{
    AccountMapping, BuSchluessel, ChartOfAccounts, NamedAccount, account_by_name,
    account_by_number, contra_account, is_mappable_rate,
};
pub use extf::{
    DatevConfig, DatevConfigBuilder, DatevRow, DebitCredit, invoice_to_row, to_extf, to_extf_at,
};
