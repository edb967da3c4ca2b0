use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::store::LedgerStore;
use crate::core::{LedgerError, Party, into_result, round_half_up, validate_provider_tax_ids};

/// Revenue totals over a period, read from the daily metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// `YYYY-MM` for a month, otherwise `from..to`.
    pub period: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub net_revenue: Decimal,
    pub gross_revenue: Decimal,
    pub vat_collected: Decimal,
    pub transaction_count: u64,
    /// Days with at least one recorded sale.
    pub active_days: usize,
}

impl PeriodSummary {
    /// Net revenue per sale, 0 when there were none.
    pub fn average_deal_size(&self) -> Decimal {
        if self.transaction_count == 0 {
            return Decimal::ZERO;
        }
        round_half_up(self.net_revenue / Decimal::from(self.transaction_count), 2)
    }
}

/// Sum the stored daily metrics in `from..=to`.
pub fn summarize<S: LedgerStore + ?Sized>(
    store: &S,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<PeriodSummary, LedgerError> {
    summarize_labelled(store, from, to, summary_label(from, to))
}

/// Summary of one calendar month, labelled `YYYY-MM`.
pub fn month_summary<S: LedgerStore + ?Sized>(
    store: &S,
    year: i32,
    month: u32,
) -> Result<PeriodSummary, LedgerError> {
    let (from, to) = month_bounds(year, month)?;
    summarize_labelled(store, from, to, month_label(from))
}

fn summarize_labelled<S: LedgerStore + ?Sized>(
    store: &S,
    from: NaiveDate,
    to: NaiveDate,
    period: String,
) -> Result<PeriodSummary, LedgerError> {
    if from > to {
        return Err(LedgerError::Validation(format!(
            "period: start {from} is after end {to}"
        )));
    }

    let mut summary = PeriodSummary {
        period,
        from,
        to,
        net_revenue: Decimal::ZERO,
        gross_revenue: Decimal::ZERO,
        vat_collected: Decimal::ZERO,
        transaction_count: 0,
        active_days: 0,
    };
    let overflow = || LedgerError::Overflow(format!("totals for {}", summary_label(from, to)));
    for day in store.daily_metrics(from, to)? {
        summary.net_revenue = summary.net_revenue.checked_add(day.net_revenue).ok_or_else(overflow)?;
        summary.gross_revenue = summary.gross_revenue.checked_add(day.gross_revenue).ok_or_else(overflow)?;
        summary.vat_collected = summary.vat_collected.checked_add(day.vat_collected).ok_or_else(overflow)?;
        summary.transaction_count = summary
            .transaction_count
            .checked_add(day.transaction_count)
            .ok_or_else(overflow)?;
        if day.transaction_count > 0 {
            summary.active_days += 1;
        }
    }
    Ok(summary)
}

fn summary_label(from: NaiveDate, to: NaiveDate) -> String {
    format!("{from}..{to}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreparationStatus {
    /// Figures assembled, not transmitted.
    Prepared,
}

/// Data for a monthly VAT advance return (Umsatzsteuer-Voranmeldung).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VatReturnPreparation {
    pub id: String,
    /// `YYYY-MM`
    pub period: String,
    pub vat_id: Option<String>,
    pub tax_number: Option<String>,
    pub net_turnover: Decimal,
    pub vat: Decimal,
    pub gross_turnover: Decimal,
    pub transaction_count: u64,
    pub status: PreparationStatus,
}

/// Assemble the VAT advance return for one month from the daily metrics.
///
/// The provider must carry a well-formed VAT id or tax number. Nothing is
/// submitted.
pub fn prepare_vat_return<S: LedgerStore + ?Sized>(
    store: &S,
    provider: &Party,
    year: i32,
    month: u32,
) -> Result<VatReturnPreparation, LedgerError> {
    into_result(validate_provider_tax_ids(provider, "provider"))?;
    let summary = month_summary(store, year, month)?;
    tracing::info!(
        period = %summary.period,
        vat = %summary.vat_collected,
        "VAT advance return prepared"
    );
    Ok(VatReturnPreparation {
        id: uuid::Uuid::new_v4().to_string(),
        period: summary.period,
        vat_id: provider.vat_id.clone(),
        tax_number: provider.tax_number.clone(),
        net_turnover: summary.net_revenue,
        vat: summary.vat_collected,
        gross_turnover: summary.gross_revenue,
        transaction_count: summary.transaction_count,
        status: PreparationStatus::Prepared,
    })
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), LedgerError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::Validation(format!("period: invalid month {year}-{month}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| LedgerError::Validation(format!("period: month {year}-{month} out of range")))?;
    Ok((first, last))
}

fn month_label(first: NaiveDate) -> String {
    first.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn month_bounds_handle_leap_february() {
        let (from, to) = month_bounds(2024, 2).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let (_, dec_end) = month_bounds(2023, 12).unwrap();
        assert_eq!(dec_end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(month_bounds(2024, 13).unwrap_err().is_validation());
        assert!(month_bounds(2024, 0).is_err());
    }

    #[test]
    fn average_deal_size() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut s = PeriodSummary {
            period: "2024-01".into(),
            from: day,
            to: day,
            net_revenue: dec!(100),
            gross_revenue: dec!(119),
            vat_collected: dec!(19),
            transaction_count: 3,
            active_days: 1,
        };
        assert_eq!(s.average_deal_size(), dec!(33.33));
        s.transaction_count = 0;
        assert_eq!(s.average_deal_size(), Decimal::ZERO);
    }
}
