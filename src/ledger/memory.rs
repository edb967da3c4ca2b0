use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::metrics::{DailyMetrics, MetricsDelta};
use super::store::LedgerStore;
use crate::core::{Invoice, LedgerError};

/// In-process [`LedgerStore`].
///
/// A single mutex guards invoices and metrics together, so `commit_sale`
/// is one critical section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    invoices: HashMap<String, Invoice>,
    by_transaction: HashMap<String, String>,
    daily: BTreeMap<NaiveDate, DailyMetrics>,
}

impl State {
    fn check_new(&self, invoice: &Invoice) -> Result<(), LedgerError> {
        if self.invoices.contains_key(&invoice.id) {
            return Err(LedgerError::DuplicateInvoice(invoice.id.clone()));
        }
        if self.by_transaction.contains_key(invoice.transaction_id()) {
            return Err(LedgerError::DuplicateTransaction(
                invoice.transaction_id().to_string(),
            ));
        }
        Ok(())
    }

    fn insert(&mut self, invoice: &Invoice) {
        self.by_transaction
            .insert(invoice.transaction_id().to_string(), invoice.id.clone());
        self.invoices.insert(invoice.id.clone(), invoice.clone());
    }

    /// The record for `date` with `delta` applied. Nothing is written.
    fn incremented(&self, date: NaiveDate, delta: &MetricsDelta) -> Result<DailyMetrics, LedgerError> {
        let mut record = self
            .daily
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailyMetrics::empty(date));
        record.apply(delta)?;
        Ok(record)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored invoices.
    pub fn invoice_count(&self) -> Result<usize, LedgerError> {
        Ok(self.lock()?.invoices.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Persistence("ledger store lock poisoned".into()))
    }
}

impl LedgerStore for MemoryStore {
    fn insert_invoice(&self, invoice: &Invoice) -> Result<(), LedgerError> {
        let mut state = self.lock()?;
        state.check_new(invoice)?;
        state.insert(invoice);
        Ok(())
    }

    fn increment_daily(
        &self,
        date: NaiveDate,
        delta: &MetricsDelta,
    ) -> Result<DailyMetrics, LedgerError> {
        let mut state = self.lock()?;
        let updated = state.incremented(date, delta)?;
        state.daily.insert(date, updated.clone());
        Ok(updated)
    }

    fn commit_sale(
        &self,
        invoice: &Invoice,
        delta: Option<&MetricsDelta>,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock()?;
        state.check_new(invoice)?;
        let updated = delta
            .map(|delta| state.incremented(invoice.service_date, delta))
            .transpose()?;
        state.insert(invoice);
        if let Some(metrics) = updated {
            state.daily.insert(metrics.date, metrics);
        }
        Ok(())
    }

    fn invoice(&self, id: &str) -> Result<Option<Invoice>, LedgerError> {
        Ok(self.lock()?.invoices.get(id).cloned())
    }

    fn invoice_for_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Invoice>, LedgerError> {
        let state = self.lock()?;
        Ok(state
            .by_transaction
            .get(transaction_id)
            .and_then(|id| state.invoices.get(id))
            .cloned())
    }

    fn invoices_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, LedgerError> {
        let state = self.lock()?;
        let mut found: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|inv| inv.service_date >= from && inv.service_date <= to)
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.service_date, &a.id).cmp(&(b.service_date, &b.id)));
        Ok(found)
    }

    fn daily_metrics(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyMetrics>, LedgerError> {
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self.lock()?.daily.range(from..=to).map(|(_, m)| m.clone()).collect())
    }

    fn put_daily(&self, metrics: DailyMetrics) -> Result<(), LedgerError> {
        self.lock()?.daily.insert(metrics.date, metrics);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{STANDARD_VAT_RATE, compute_amount};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn increment_creates_then_accumulates() {
        let store = MemoryStore::new();
        let delta = MetricsDelta::from_tax(&compute_amount(dec!(50), STANDARD_VAT_RATE).unwrap());

        let first = store.increment_daily(day(1), &delta).unwrap();
        assert_eq!(first.transaction_count, 1);
        let second = store.increment_daily(day(1), &delta).unwrap();
        assert_eq!(second.transaction_count, 2);
        assert_eq!(second.net_revenue, dec!(100));
        assert_eq!(second.vat_collected, dec!(19.00));
    }

    #[test]
    fn daily_metrics_range_is_inclusive_and_ordered() {
        let store = MemoryStore::new();
        let delta = MetricsDelta::from_tax(&compute_amount(dec!(10), STANDARD_VAT_RATE).unwrap());
        for d in [5, 1, 3] {
            store.increment_daily(day(d), &delta).unwrap();
        }

        let dates: Vec<_> = store
            .daily_metrics(day(1), day(3))
            .unwrap()
            .into_iter()
            .map(|m| m.date)
            .collect();
        assert_eq!(dates, vec![day(1), day(3)]);
        assert!(store.daily_metrics(day(4), day(2)).unwrap().is_empty());
    }

    #[test]
    fn overflow_is_rejected_without_poisoning_the_store() {
        let store = MemoryStore::new();
        let big = MetricsDelta::from_tax(
            &compute_amount(dec!(50000000000000000000000000000), rust_decimal::Decimal::ZERO).unwrap(),
        );
        store.increment_daily(day(1), &big).unwrap();

        let err = store.increment_daily(day(1), &big).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));

        let stored = store.daily_metrics(day(1), day(1)).unwrap();
        assert_eq!(stored[0].transaction_count, 1);
        assert_eq!(stored[0].net_revenue, dec!(50000000000000000000000000000));
    }
}
