use tracing::debug;

use super::metrics::{DailyMetrics, MetricsDelta};
use super::store::LedgerStore;
use crate::core::{Direction, LedgerError, TaxCalculation, Transaction};

/// The metrics increment a transaction contributes, if any.
///
/// Expenses are not revenue and contribute nothing.
pub fn metrics_delta(
    transaction: &Transaction,
    tax: &TaxCalculation,
) -> Result<Option<MetricsDelta>, LedgerError> {
    if tax.net_amount() != transaction.amount() {
        return Err(LedgerError::Builder(format!(
            "tax calculation net {} does not match transaction {} amount {}",
            tax.net_amount(),
            transaction.id(),
            transaction.amount()
        )));
    }
    match transaction.direction() {
        Direction::Income => Ok(Some(MetricsDelta::from_tax(tax))),
        Direction::Expense => Ok(None),
    }
}

/// Add a completed transaction to its day's metrics.
///
/// The day is the transaction's completion date. The record is created on
/// first use and incremented atomically by the store, so concurrent calls
/// for the same day never lose an update. Returns the record after the
/// increment, or `None` for an expense.
pub fn record<S: LedgerStore + ?Sized>(
    store: &S,
    transaction: &Transaction,
    tax: &TaxCalculation,
) -> Result<Option<DailyMetrics>, LedgerError> {
    let Some(delta) = metrics_delta(transaction, tax)? else {
        debug!(transaction_id = transaction.id(), "expense not aggregated");
        return Ok(None);
    };
    let date = transaction.completed_on();
    let metrics = store.increment_daily(date, &delta)?;
    debug!(
        date = %date,
        transaction_id = transaction.id(),
        count = metrics.transaction_count,
        "daily metrics incremented"
    );
    Ok(Some(metrics))
}
