use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{LedgerError, TaxCalculation};

/// Running revenue totals for one calendar day.
///
/// Serialized with `date` as `YYYY-MM-DD`, the store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub net_revenue: Decimal,
    pub gross_revenue: Decimal,
    pub vat_collected: Decimal,
    pub transaction_count: u64,
}

impl DailyMetrics {
    /// A zeroed record for `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            net_revenue: Decimal::ZERO,
            gross_revenue: Decimal::ZERO,
            vat_collected: Decimal::ZERO,
            transaction_count: 0,
        }
    }

    /// Store key, `YYYY-MM-DD`.
    pub fn key(&self) -> String {
        date_key(self.date)
    }

    /// Add one increment. Deltas are never negative, so totals only grow.
    ///
    /// On overflow the record is left unchanged.
    pub fn apply(&mut self, delta: &MetricsDelta) -> Result<(), LedgerError> {
        let overflow = || LedgerError::Overflow(format!("daily totals for {}", self.date));
        let net_revenue = self.net_revenue.checked_add(delta.net).ok_or_else(overflow)?;
        let gross_revenue = self.gross_revenue.checked_add(delta.gross).ok_or_else(overflow)?;
        let vat_collected = self.vat_collected.checked_add(delta.vat).ok_or_else(overflow)?;
        let transaction_count = self
            .transaction_count
            .checked_add(delta.count)
            .ok_or_else(overflow)?;

        self.net_revenue = net_revenue;
        self.gross_revenue = gross_revenue;
        self.vat_collected = vat_collected;
        self.transaction_count = transaction_count;
        Ok(())
    }
}

/// Format a date as a daily metrics key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The increment one completed sale contributes to its day.
///
/// Only constructible from a [`TaxCalculation`], whose amounts are positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsDelta {
    net: Decimal,
    gross: Decimal,
    vat: Decimal,
    count: u64,
}

impl MetricsDelta {
    pub fn from_tax(tax: &TaxCalculation) -> Self {
        Self {
            net: tax.net_amount(),
            gross: tax.gross_amount(),
            vat: tax.vat_amount(),
            count: 1,
        }
    }

    pub fn net(&self) -> Decimal {
        self.net
    }

    pub fn gross(&self) -> Decimal {
        self.gross
    }

    pub fn vat(&self) -> Decimal {
        self.vat
    }
}
