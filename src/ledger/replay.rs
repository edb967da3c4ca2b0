use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::metrics::{DailyMetrics, MetricsDelta};
use super::store::LedgerStore;
use crate::core::{Invoice, LedgerError};

/// Rebuild daily metrics from an invoice log.
///
/// Only income invoices count; each lands on its service date.
pub fn replay_daily(invoices: &[Invoice]) -> Result<BTreeMap<NaiveDate, DailyMetrics>, LedgerError> {
    let mut days = BTreeMap::new();
    for invoice in invoices.iter().filter(|inv| inv.is_income()) {
        days.entry(invoice.service_date)
            .or_insert_with(|| DailyMetrics::empty(invoice.service_date))
            .apply(&MetricsDelta::from_tax(&invoice.tax))?;
    }
    Ok(days)
}

/// A day whose stored metrics disagree with the invoice log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationInconsistency {
    pub date: NaiveDate,
    /// `None` when no record exists for the day.
    pub stored: Option<DailyMetrics>,
    pub replayed: DailyMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub checked_days: usize,
    pub inconsistencies: Vec<AggregationInconsistency>,
    pub repaired: bool,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Compare stored daily metrics in `from..=to` with a replay of the stored
/// invoices. With `repair`, differing records are overwritten with the
/// replayed values. This is the only path that rewrites a record.
pub fn reconcile<S: LedgerStore + ?Sized>(
    store: &S,
    from: NaiveDate,
    to: NaiveDate,
    repair: bool,
) -> Result<ReconciliationReport, LedgerError> {
    if from > to {
        return Err(LedgerError::Validation(format!(
            "period: start {from} is after end {to}"
        )));
    }

    let replayed = replay_daily(&store.invoices_between(from, to)?)?;
    let stored: BTreeMap<NaiveDate, DailyMetrics> = store
        .daily_metrics(from, to)?
        .into_iter()
        .map(|m| (m.date, m))
        .collect();

    let dates: BTreeSet<NaiveDate> = replayed.keys().chain(stored.keys()).copied().collect();
    let mut inconsistencies = Vec::new();
    for date in &dates {
        let expected = replayed
            .get(date)
            .cloned()
            .unwrap_or_else(|| DailyMetrics::empty(*date));
        let actual = stored.get(date);
        if actual != Some(&expected) && !(actual.is_none() && expected.transaction_count == 0) {
            warn!(
                date = %date,
                stored_count = actual.map(|m| m.transaction_count),
                replayed_count = expected.transaction_count,
                "daily metrics disagree with invoice log"
            );
            inconsistencies.push(AggregationInconsistency {
                date: *date,
                stored: actual.cloned(),
                replayed: expected,
            });
        }
    }

    if repair {
        for item in &inconsistencies {
            store.put_daily(item.replayed.clone())?;
        }
    }

    info!(
        from = %from,
        to = %to,
        checked = dates.len(),
        inconsistent = inconsistencies.len(),
        repaired = repair && !inconsistencies.is_empty(),
        "reconciliation finished"
    );

    Ok(ReconciliationReport {
        from,
        to,
        checked_days: dates.len(),
        repaired: repair && !inconsistencies.is_empty(),
        inconsistencies,
    })
}
