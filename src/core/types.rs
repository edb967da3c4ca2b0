use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// The only currency this ledger books in.
pub const CURRENCY: &str = "EUR";

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sale / revenue.
    Income,
    /// Purchase / operating expense.
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "direction: unknown value '{other}', expected 'income' or 'expense'"
            ))),
        }
    }
}

/// One economic event. Immutable once created.
///
/// All constructors validate, so a `Transaction` value always has a
/// positive amount, a non-empty id and (if present) a VAT override in `0..=1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction")]
pub struct Transaction {
    id: String,
    amount: Decimal,
    currency: String,
    direction: Direction,
    service_type: String,
    vat_rate: Option<Decimal>,
    completed_at: NaiveDateTime,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        amount: Decimal,
        direction: Direction,
        service_type: impl Into<String>,
        completed_at: NaiveDateTime,
    ) -> Result<Self, LedgerError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "transaction id must not be empty".into(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        Ok(Self {
            id,
            amount,
            currency: CURRENCY.to_string(),
            direction,
            service_type: service_type.into(),
            vat_rate: None,
            completed_at,
        })
    }

    /// Attach a VAT rate override (fraction, e.g. `0.19`).
    pub fn with_vat_rate(mut self, rate: Decimal) -> Result<Self, LedgerError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(LedgerError::InvalidRate(rate));
        }
        self.vat_rate = Some(rate);
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn vat_rate(&self) -> Option<Decimal> {
        self.vat_rate
    }

    pub fn completed_at(&self) -> NaiveDateTime {
        self.completed_at
    }

    /// Calendar day the transaction completed on; the daily metrics key.
    pub fn completed_on(&self) -> NaiveDate {
        self.completed_at.date()
    }
}

#[derive(Deserialize)]
struct RawTransaction {
    id: String,
    amount: Decimal,
    currency: String,
    direction: Direction,
    service_type: String,
    vat_rate: Option<Decimal>,
    completed_at: NaiveDateTime,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        if raw.currency != CURRENCY {
            return Err(LedgerError::Validation(format!(
                "currency: '{}' is not supported, only {CURRENCY}",
                raw.currency
            )));
        }
        let tx = Transaction::new(
            raw.id,
            raw.amount,
            raw.direction,
            raw.service_type,
            raw.completed_at,
        )?;
        match raw.vat_rate {
            Some(rate) => tx.with_vat_rate(rate),
            None => Ok(tx),
        }
    }
}

/// Net / VAT / gross figures for one transaction.
///
/// Only produced by [`compute`](super::compute); never authored by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculation {
    pub(crate) net_amount: Decimal,
    pub(crate) vat_rate: Decimal,
    pub(crate) vat_amount: Decimal,
    pub(crate) gross_amount: Decimal,
    pub(crate) currency: String,
}

impl TaxCalculation {
    pub fn net_amount(&self) -> Decimal {
        self.net_amount
    }

    /// VAT rate as a fraction (`0.19`, not `19`).
    pub fn vat_rate(&self) -> Decimal {
        self.vat_rate
    }

    pub fn vat_amount(&self) -> Decimal {
        self.vat_amount
    }

    pub fn gross_amount(&self) -> Decimal {
        self.gross_amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// True for §19 UStG / exempt calculations (rate 0).
    pub fn is_exempt(&self) -> bool {
        self.vat_rate.is_zero()
    }
}

/// Tax category of the rendered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Marketing services.
    MarketingService,
    /// IT services (automation, software).
    ItService,
    /// Consulting services.
    ConsultingService,
    /// Anything not matched by a keyword rule.
    OtherService,
}

impl ServiceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MarketingService => "marketing service",
            Self::ItService => "IT service",
            Self::ConsultingService => "consulting service",
            Self::OtherService => "other service",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// SKR03 booking account used for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingAccount {
    /// 8400 Erlöse aus Dienstleistungen.
    #[serde(rename = "8400")]
    ServiceRevenue,
    /// 4920 Sonstige betriebliche Aufwendungen.
    #[serde(rename = "4920")]
    OperatingExpenses,
}

impl BookingAccount {
    pub fn number(&self) -> u32 {
        match self {
            Self::ServiceRevenue => 8400,
            Self::OperatingExpenses => 4920,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ServiceRevenue => "8400",
            Self::OperatingExpenses => "4920",
        }
    }

    /// German account name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceRevenue => "Erlöse aus Dienstleistungen",
            Self::OperatingExpenses => "Sonstige betriebliche Aufwendungen",
        }
    }
}

/// Bookkeeping classification of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tax_category: ServiceCategory,
    /// True only for expenses.
    pub deductible: bool,
    pub booking_account: BookingAccount,
}

/// Seller or buyer identity printed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Person or legal name.
    pub name: String,
    /// Trading name (e.g. the company brand of a sole proprietor).
    pub trading_name: Option<String>,
    pub address: Option<Address>,
    pub email: Option<String>,
    /// Steuernummer.
    pub tax_number: Option<String>,
    /// USt-IdNr.
    pub vat_id: Option<String>,
    /// Customer reference (customer number or e-mail used to identify the buyer).
    pub reference: Option<String>,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub postal_code: String,
    pub city: String,
    /// ISO 3166-1 alpha-2.
    pub country_code: String,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(street) = &self.street {
            write!(f, "{street}, ")?;
        }
        write!(f, "{} {}, {}", self.postal_code, self.city, self.country_code)
    }
}

/// UNTDID 1001 invoice type codes used by this ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceTypeCode {
    /// 380, commercial invoice.
    Invoice,
    /// 384, corrected invoice.
    Corrected,
}

impl InvoiceTypeCode {
    pub fn code(&self) -> u16 {
        match self {
            Self::Invoice => 380,
            Self::Corrected => 384,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            380 => Some(Self::Invoice),
            384 => Some(Self::Corrected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Open,
}

/// Payment block of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// e.g. "paypal", "sepa".
    pub method: String,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

/// An issued invoice. Never updated in place; corrections are new invoices
/// with [`InvoiceTypeCode::Corrected`] and `corrects` set.
///
/// Amounts are read from the embedded [`TaxCalculation`]; the invoice holds
/// no second copy that could drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub type_code: InvoiceTypeCode,
    /// Id of the invoice this one corrects.
    pub corrects: Option<String>,
    pub issue_date: NaiveDate,
    /// Leistungsdatum: the day the underlying transaction completed.
    pub service_date: NaiveDate,
    pub transaction: Transaction,
    pub classification: Classification,
    pub tax: TaxCalculation,
    pub service_description: String,
    pub provider: Party,
    pub customer: Party,
    pub payment: Payment,
    pub legal_notes: Vec<String>,
}

impl Invoice {
    pub fn transaction_id(&self) -> &str {
        self.transaction.id()
    }

    pub fn net_amount(&self) -> Decimal {
        self.tax.net_amount
    }

    pub fn vat_amount(&self) -> Decimal {
        self.tax.vat_amount
    }

    pub fn gross_amount(&self) -> Decimal {
        self.tax.gross_amount
    }

    pub fn is_income(&self) -> bool {
        self.transaction.direction() == Direction::Income
    }
}
