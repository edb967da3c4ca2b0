//! DATEV EXTF Buchungsstapel CSV generation.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts::{self, ChartOfAccounts};
use crate::core::{Direction, Invoice, LedgerError};

/// Configuration for DATEV EXTF export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatevConfig {
    /// Beraternummer, min 1001.
    pub consultant_number: u32,
    /// Mandantennummer.
    pub client_number: u32,
    /// Wirtschaftsjahr-Beginn.
    pub fiscal_year_start: NaiveDate,
    /// Sachkontenlänge, typically 4.
    pub account_length: u8,
    pub chart: ChartOfAccounts,
    /// Debitor account for customers (10000-69999).
    pub default_debitor: u32,
    /// Kreditor account for suppliers (70000-99999).
    pub default_creditor: u32,
    /// Herkunft, max 2 chars.
    pub source: String,
    /// Exportiert von, max 25 chars.
    pub exported_by: String,
    /// Bezeichnung, max 30 chars.
    pub description: String,
    /// Festschreibung on import.
    pub lock_postings: bool,
}

impl Default for DatevConfig {
    fn default() -> Self {
        Self {
            consultant_number: 1001,
            client_number: 1,
            fiscal_year_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            account_length: 4,
            chart: ChartOfAccounts::SKR03,
            default_debitor: 10000,
            default_creditor: 70000,
            source: "RE".into(),
            exported_by: String::new(),
            description: "Buchungsstapel".into(),
            lock_postings: false,
        }
    }
}

/// Builder for [`DatevConfig`].
///
/// ```
/// use steuerbuch::datev::DatevConfigBuilder;
/// use chrono::NaiveDate;
///
/// let config = DatevConfigBuilder::new(12345, 99999)
///     .fiscal_year_start(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .exported_by("steuerbuch")
///     .build();
/// assert_eq!(config.default_debitor, 10000);
/// ```
pub struct DatevConfigBuilder {
    config: DatevConfig,
}

impl DatevConfigBuilder {
    /// Start from the required consultant and client numbers.
    pub fn new(consultant_number: u32, client_number: u32) -> Self {
        Self {
            config: DatevConfig {
                consultant_number,
                client_number,
                ..Default::default()
            },
        }
    }

    /// Set the fiscal year start date.
    pub fn fiscal_year_start(mut self, date: NaiveDate) -> Self {
        self.config.fiscal_year_start = date;
        self
    }

    /// Set the G/L account length (typically 4).
    pub fn account_length(mut self, len: u8) -> Self {
        self.config.account_length = len;
        self
    }

    /// Set the chart of accounts.
    pub fn chart(mut self, chart: ChartOfAccounts) -> Self {
        self.config.chart = chart;
        self
    }

    /// Set the debitor account used for income rows.
    pub fn default_debitor(mut self, account: u32) -> Self {
        self.config.default_debitor = account;
        self
    }

    /// Set the creditor account used for expense rows.
    pub fn default_creditor(mut self, account: u32) -> Self {
        self.config.default_creditor = account;
        self
    }

    /// Set the source identifier (max 2 chars).
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.config.source = source.into();
        self
    }

    /// Set the "exported by" label (max 25 chars).
    pub fn exported_by(mut self, name: impl Into<String>) -> Self {
        self.config.exported_by = name.into();
        self
    }

    /// Set the batch description (max 30 chars).
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.config.description = desc.into();
        self
    }

    /// Lock postings (Festschreibung) on import.
    pub fn lock_postings(mut self, lock: bool) -> Self {
        self.config.lock_postings = lock;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> DatevConfig {
        self.config
    }
}

/// One Buchungsstapel row.
#[derive(Debug, Clone)]
pub struct DatevRow {
    /// Gross amount, always positive.
    pub amount: Decimal,
    pub debit_credit: DebitCredit,
    /// Konto (debitor or creditor).
    pub account: u32,
    /// Gegenkonto.
    pub contra_account: u32,
    /// Empty for Automatikkonten.
    pub bu_key: Option<u8>,
    pub date: NaiveDate,
    /// Belegfeld 1, the invoice id.
    pub document_number: String,
    /// Belegfeld 2, the corrected invoice id.
    pub reference_number: Option<String>,
    /// Buchungstext, max 60 chars.
    pub posting_text: String,
    pub service_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitCredit {
    /// Soll.
    Soll,
    /// Haben.
    Haben,
}

impl DebitCredit {
    fn code(&self) -> &'static str {
        match self {
            Self::Soll => "S",
            Self::Haben => "H",
        }
    }
}

/// Generate a DATEV EXTF Buchungsstapel CSV from issued invoices.
///
/// CRLF line endings; the caller encodes to ISO-8859-1 if needed.
pub fn to_extf(invoices: &[Invoice], config: &DatevConfig) -> Result<String, LedgerError> {
    to_extf_at(invoices, config, chrono::Local::now().naive_local())
}

/// Like [`to_extf`] with an explicit creation timestamp for the header.
pub fn to_extf_at(
    invoices: &[Invoice],
    config: &DatevConfig,
    created: NaiveDateTime,
) -> Result<String, LedgerError> {
    let (period_start, period_end) = date_range(invoices)
        .ok_or_else(|| LedgerError::Builder("no invoices to export".into()))?;

    let rows = invoices
        .iter()
        .map(|inv| invoice_to_row(inv, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = String::new();
    write_header(&mut out, config, created, period_start, period_end);
    write_column_headers(&mut out);
    for row in &rows {
        write_data_row(&mut out, row);
    }

    tracing::debug!(rows = rows.len(), "DATEV batch written");
    Ok(out)
}

/// One gross posting per invoice.
pub fn invoice_to_row(inv: &Invoice, config: &DatevConfig) -> Result<DatevRow, LedgerError> {
    let mapping = accounts::contra_account(config.chart, inv.classification.booking_account, &inv.tax)?;
    let bu_key = if mapping.is_automatik {
        None
    } else {
        mapping.bu_key.map(|k| k.0)
    };

    let (debit_credit, account) = match inv.transaction.direction() {
        Direction::Income => (DebitCredit::Soll, config.default_debitor),
        Direction::Expense => (DebitCredit::Haben, config.default_creditor),
    };

    Ok(DatevRow {
        amount: inv.gross_amount(),
        debit_credit,
        account,
        contra_account: mapping.account,
        bu_key,
        date: inv.issue_date,
        document_number: truncate(&inv.id, 36),
        reference_number: inv.corrects.as_deref().map(|id| truncate(id, 36)),
        posting_text: truncate(&format!("{} {}", inv.id, inv.service_description), 60),
        service_date: inv.service_date,
        due_date: inv.payment.due_date,
    })
}

fn date_range(invoices: &[Invoice]) -> Option<(NaiveDate, NaiveDate)> {
    let min = invoices.iter().map(|inv| inv.issue_date).min()?;
    let max = invoices.iter().map(|inv| inv.issue_date).max()?;
    Some((min, max))
}

fn write_header(
    out: &mut String,
    config: &DatevConfig,
    created: NaiveDateTime,
    period_start: NaiveDate,
    period_end: NaiveDate,
) {
    let now = created.format("%Y%m%d%H%M%S000");
    let fy = config.fiscal_year_start.format("%Y%m%d");
    let ps = period_start.format("%Y%m%d");
    let pe = period_end.format("%Y%m%d");

    // 31 fields
    out.push_str(&format!(
        "\"EXTF\";700;21;\"Buchungsstapel\";13;{now};;\"{}\";\"{}\";\"\";\
         {};{};{fy};{};{ps};{pe};\"{}\";\"\";1;0;{};\"EUR\";;\"\";;\
         ;\"{}\";;;\"\"",
        truncate(&config.source, 2),
        truncate(&config.exported_by, 25),
        config.consultant_number,
        config.client_number,
        config.account_length,
        truncate(&config.description, 30),
        if config.lock_postings { 1 } else { 0 },
        config.chart.code(),
    ));
    out.push_str("\r\n");
}

fn write_column_headers(out: &mut String) {
    let headers = [
        "Umsatz (ohne Soll/Haben-Kz)",
        "Soll/Haben-Kennzeichen",
        "WKZ Umsatz",
        "Kurs",
        "Basisumsatz",
        "WKZ Basisumsatz",
        "Konto",
        "Gegenkonto (ohne BU-Schlüssel)",
        "BU-Schlüssel",
        "Belegdatum",
        "Belegfeld 1",
        "Belegfeld 2",
        "Skonto",
        "Buchungstext",
    ];
    out.push_str(&headers.join(";"));
    // Fields 15 through 120 stay unnamed.
    for _ in headers.len()..120 {
        out.push(';');
    }
    out.push_str("\r\n");
}

fn write_data_row(out: &mut String, row: &DatevRow) {
    // 1: Umsatz
    out.push_str(&format_amount(row.amount));
    out.push(';');

    // 2: Soll/Haben
    out.push_str(&format!("\"{}\";", row.debit_credit.code()));

    // 3-6: empty for EUR
    out.push_str(";;;;");

    // 7-9: Konto, Gegenkonto, BU-Schlüssel
    out.push_str(&format!("{};{};", row.account, row.contra_account));
    if let Some(bu) = row.bu_key {
        out.push_str(&bu.to_string());
    }
    out.push(';');

    // 10: Belegdatum (DDMM)
    out.push_str(&row.date.format("%d%m").to_string());
    out.push(';');

    // 11-12: Belegfeld 1 and 2
    out.push_str(&format!("\"{}\";", row.document_number));
    if let Some(reference) = &row.reference_number {
        out.push_str(&format!("\"{reference}\""));
    }
    out.push(';');

    // 13: Skonto
    out.push(';');

    // 14: Buchungstext
    out.push_str(&format!("\"{}\"", row.posting_text));

    // 15-114
    for _ in 14..=114 {
        out.push(';');
    }

    // 115: Leistungsdatum (DDMMYYYY)
    out.push_str(&row.service_date.format("%d%m%Y").to_string());
    out.push(';');

    // 116: Datum Zuord.
    out.push(';');

    // 117: Fälligkeit (DDMMYYYY)
    out.push_str(&row.due_date.format("%d%m%Y").to_string());

    // 118-120
    out.push_str(";;;");

    out.push_str("\r\n");
}

/// German number format: comma separator, 2 decimal places.
fn format_amount(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2)).replace('.', ",")
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().replace('"', "'")
}
