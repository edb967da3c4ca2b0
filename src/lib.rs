//! # steuerbuch
//!
//! Bookkeeping core for a German sole proprietor: classify completed
//! transactions for SKR03, compute VAT, issue invoices, keep per-day revenue
//! metrics, and report on them.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use steuerbuch::core::*;
//! use steuerbuch::ledger::*;
//! use rust_decimal_macros::dec;
//!
//! let provider = PartyBuilder::new("Erika Muster")
//!     .trading_name("Muster Digital")
//!     .vat_id("DE123456789")
//!     .build();
//! let store = MemoryStore::new();
//! let processor = SaleProcessor::new(&store, LedgerConfigBuilder::new(provider).build()).unwrap();
//!
//! let sale = SaleRequest {
//!     transaction: TransactionRequest {
//!         transaction_id: Some("tx-1".into()),
//!         amount: dec!(1000.00),
//!         currency: None,
//!         direction: "income".into(),
//!         service_type: "automation_setup".into(),
//!         vat_rate: None,
//!         completed_at: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(10, 0, 0).unwrap(),
//!     },
//!     customer: PartyBuilder::new("Kunde AG").reference("kunde@example.com").build(),
//!     payment_method: None,
//!     corrects: None,
//! };
//!
//! let processed = processor.complete_sale(&sale).unwrap();
//! assert_eq!(processed.invoice.gross_amount(), dec!(1190.00));
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let summary = summarize(&store, day, day).unwrap();
//! assert_eq!(summary.transaction_count, 1);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Types, VAT calculator, classifier, invoice builder, invoice ids |
//! | `ledger` | Store trait, in-memory store, daily metrics, reports, sale pipeline |
//! | `estimate` | Advisory income/trade tax estimate and annual tax report |
//! | `datev` | DATEV Buchungsstapel EXTF CSV export |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ledger")]
pub mod ledger;

#[cfg(feature = "estimate")]
pub mod estimate;

#[cfg(feature = "datev")]
pub mod datev;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
