use std::sync::Arc;

use chrono::NaiveDate;

use super::metrics::{DailyMetrics, MetricsDelta};
use crate::core::{Invoice, LedgerError};

/// Document store the ledger writes invoices and daily metrics to.
///
/// Every method is atomic with respect to every other call on the same
/// store. Implementations backed by a database must map these onto its
/// atomic primitives (insert-if-absent, `$inc`-style upserts, transactions);
/// a read-then-write in the caller is never required.
pub trait LedgerStore: Send + Sync {
    /// Insert an invoice once. Fails with [`LedgerError::DuplicateInvoice`]
    /// if the id exists and [`LedgerError::DuplicateTransaction`] if the
    /// transaction already has an invoice.
    fn insert_invoice(&self, invoice: &Invoice) -> Result<(), LedgerError>;

    /// Upsert the record for `date` and add `delta` to it in one step.
    /// Returns the record after the increment. A total that would overflow
    /// fails with [`LedgerError::Overflow`] and leaves the record unchanged.
    fn increment_daily(
        &self,
        date: NaiveDate,
        delta: &MetricsDelta,
    ) -> Result<DailyMetrics, LedgerError>;

    /// Insert the invoice and apply the metrics increment as one batch:
    /// either both happen or neither does. An overflowing daily total
    /// rejects the whole batch.
    fn commit_sale(
        &self,
        invoice: &Invoice,
        delta: Option<&MetricsDelta>,
    ) -> Result<(), LedgerError>;

    /// Look up an invoice by its id.
    fn invoice(&self, id: &str) -> Result<Option<Invoice>, LedgerError>;

    /// The invoice issued for a transaction, if any.
    fn invoice_for_transaction(&self, transaction_id: &str)
    -> Result<Option<Invoice>, LedgerError>;

    /// Invoices whose service date lies in `from..=to`, ordered by service
    /// date, then id.
    fn invoices_between(&self, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<Invoice>, LedgerError>;

    /// Stored daily records in `from..=to`, ordered by date. Days without a
    /// record are omitted.
    fn daily_metrics(&self, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<DailyMetrics>, LedgerError>;

    /// Overwrite a daily record. Only used by reconciliation.
    fn put_daily(&self, metrics: DailyMetrics) -> Result<(), LedgerError>;
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn insert_invoice(&self, invoice: &Invoice) -> Result<(), LedgerError> {
        (**self).insert_invoice(invoice)
    }

    fn increment_daily(
        &self,
        date: NaiveDate,
        delta: &MetricsDelta,
    ) -> Result<DailyMetrics, LedgerError> {
        (**self).increment_daily(date, delta)
    }

    fn commit_sale(
        &self,
        invoice: &Invoice,
        delta: Option<&MetricsDelta>,
    ) -> Result<(), LedgerError> {
        (**self).commit_sale(invoice, delta)
    }

    fn invoice(&self, id: &str) -> Result<Option<Invoice>, LedgerError> {
        (**self).invoice(id)
    }

    fn invoice_for_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Invoice>, LedgerError> {
        (**self).invoice_for_transaction(transaction_id)
    }

    fn invoices_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, LedgerError> {
        (**self).invoices_between(from, to)
    }

    fn daily_metrics(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyMetrics>, LedgerError> {
        (**self).daily_metrics(from, to)
    }

    fn put_daily(&self, metrics: DailyMetrics) -> Result<(), LedgerError> {
        (**self).put_daily(metrics)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn insert_invoice(&self, invoice: &Invoice) -> Result<(), LedgerError> {
        (**self).insert_invoice(invoice)
    }

    fn increment_daily(
        &self,
        date: NaiveDate,
        delta: &MetricsDelta,
    ) -> Result<DailyMetrics, LedgerError> {
        (**self).increment_daily(date, delta)
    }

    fn commit_sale(
        &self,
        invoice: &Invoice,
        delta: Option<&MetricsDelta>,
    ) -> Result<(), LedgerError> {
        (**self).commit_sale(invoice, delta)
    }

    fn invoice(&self, id: &str) -> Result<Option<Invoice>, LedgerError> {
        (**self).invoice(id)
    }

    fn invoice_for_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Invoice>, LedgerError> {
        (**self).invoice_for_transaction(transaction_id)
    }

    fn invoices_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, LedgerError> {
        (**self).invoices_between(from, to)
    }

    fn daily_metrics(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyMetrics>, LedgerError> {
        (**self).daily_metrics(from, to)
    }

    fn put_daily(&self, metrics: DailyMetrics) -> Result<(), LedgerError> {
        (**self).put_daily(metrics)
    }
}
