use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::estimator::{EstimatorConfig, TaxEstimate, estimate};
use crate::core::{Direction, Invoice, round_half_up};

/// VAT due above which quarterly advance returns are recommended.
pub const QUARTERLY_VAT_THRESHOLD: Decimal = dec!(7500);

/// Expense share of income below which a deduction review is suggested.
pub const LOW_EXPENSE_RATIO: Decimal = dec!(0.30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Income,
    Expense,
    Receipt,
    /// Archived invoice copy; not summed.
    Invoice,
}

/// A bookkeeping document that feeds the annual report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDocument {
    pub kind: DocumentKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
    /// Assumed deductible unless stated otherwise.
    #[serde(default = "default_deductible")]
    pub deductible: bool,
}

fn default_deductible() -> bool {
    true
}

impl TaxDocument {
    /// Income or expense document for an issued invoice, at its net amount.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let kind = match invoice.transaction.direction() {
            Direction::Income => DocumentKind::Income,
            Direction::Expense => DocumentKind::Expense,
        };
        Self {
            kind,
            amount: invoice.net_amount(),
            date: invoice.service_date,
            description: format!("{} {}", invoice.id, invoice.service_description),
            category: Some(invoice.classification.tax_category.label().to_string()),
            vat_rate: Some(invoice.tax.vat_rate()),
            deductible: invoice.classification.deductible,
        }
    }

    /// Input VAT carried by this document, if it is a deductible purchase.
    fn input_vat(&self) -> Decimal {
        match (self.kind, self.vat_rate) {
            (DocumentKind::Expense | DocumentKind::Receipt, Some(rate))
                if self.deductible && !rate.is_zero() =>
            {
                self.amount * rate
            }
            _ => Decimal::ZERO,
        }
    }
}

/// Derive tax documents from issued invoices.
pub fn documents_from_invoices(invoices: &[Invoice]) -> Vec<TaxDocument> {
    invoices.iter().map(TaxDocument::from_invoice).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// The year closed with a loss.
    LossCarryForward,
    QuarterlyVatReturn,
    /// Few expenses relative to income.
    ReviewDeductibleExpenses,
    TradeTaxReview,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Self::LossCarryForward => "Verlust ausweisen, Verlustvortrag prüfen",
            Self::QuarterlyVatReturn => "Vierteljährliche USt-Voranmeldung empfohlen",
            Self::ReviewDeductibleExpenses => {
                "Potenzial für weitere abzugsfähige Ausgaben prüfen"
            }
            Self::TradeTaxReview => "Gewerbesteuer mit Steuerberater prüfen",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Advisory annual tax report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTaxReport {
    pub id: String,
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub input_vat: Decimal,
    pub estimate: TaxEstimate,
    pub documents_processed: usize,
    pub recommendations: Vec<Recommendation>,
}

impl AnnualTaxReport {
    pub fn profit(&self) -> Decimal {
        self.estimate.profit
    }
}

/// Build the annual report from the documents dated in `year`.
///
/// Documents from other years are ignored. Income counts income documents;
/// expenses count deductible expense and receipt documents. VAT is due
/// on income only above the small-business limit, less the input VAT.
pub fn annual_report(
    year: i32,
    documents: &[TaxDocument],
    config: &EstimatorConfig,
) -> AnnualTaxReport {
    let in_year: Vec<&TaxDocument> = documents.iter().filter(|d| d.date.year() == year).collect();

    let total_income: Decimal = in_year
        .iter()
        .filter(|d| d.kind == DocumentKind::Income)
        .map(|d| d.amount)
        .sum();
    let total_expenses: Decimal = in_year
        .iter()
        .filter(|d| matches!(d.kind, DocumentKind::Expense | DocumentKind::Receipt) && d.deductible)
        .map(|d| d.amount)
        .sum();
    let input_vat: Decimal = in_year.iter().map(|d| d.input_vat()).sum();

    let profit = total_income - total_expenses;
    let vat_due = if total_income > config.small_business_limit {
        total_income * config.vat_rate - input_vat
    } else {
        Decimal::ZERO
    };
    let estimate = estimate(profit, vat_due, config);

    let mut recommendations = Vec::new();
    if profit < Decimal::ZERO {
        recommendations.push(Recommendation::LossCarryForward);
    }
    if estimate.vat_due > QUARTERLY_VAT_THRESHOLD {
        recommendations.push(Recommendation::QuarterlyVatReturn);
    }
    if total_expenses < total_income * LOW_EXPENSE_RATIO {
        recommendations.push(Recommendation::ReviewDeductibleExpenses);
    }
    if estimate.business_tax > Decimal::ZERO {
        recommendations.push(Recommendation::TradeTaxReview);
    }

    info!(
        year,
        documents = in_year.len(),
        total = %estimate.total,
        "annual tax report generated"
    );

    AnnualTaxReport {
        id: uuid::Uuid::new_v4().to_string(),
        year,
        total_income: round_half_up(total_income, 2),
        total_expenses: round_half_up(total_expenses, 2),
        input_vat: round_half_up(input_vat, 2),
        estimate,
        documents_processed: in_year.len(),
        recommendations,
    }
}
