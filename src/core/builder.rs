use chrono::{Days, NaiveDate};

use super::classifier;
use super::error::{LedgerError, into_result};
use super::types::*;
use super::validation;

/// Days between invoice date and payment due date.
pub const PAYMENT_TERM_DAYS: u64 = 14;

/// Default payment method for completed sales.
pub const DEFAULT_PAYMENT_METHOD: &str = "paypal";

/// Builder for issuing an invoice from a classified, tax-computed transaction.
///
/// All inputs are taken by value; the finished [`Invoice`] shares nothing
/// with the caller's copies.
///
/// ```
/// use steuerbuch::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let tx = Transaction::new("tx-1", dec!(1000), Direction::Income, "consulting",
///     day.and_hms_opt(12, 0, 0).unwrap()).unwrap();
/// let tax = compute_standard(&tx).unwrap();
///
/// let invoice = InvoiceBuilder::new("ZZL-20240615-ABCDEF012345", day)
///     .classification(classify(&tx))
///     .tax(tax)
///     .transaction(tx)
///     .provider(PartyBuilder::new("Erika Muster").vat_id("DE123456789").build())
///     .customer(PartyBuilder::new("Kunde AG").reference("K-1001").build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.gross_amount(), dec!(1190.00));
/// assert_eq!(invoice.payment.due_date, NaiveDate::from_ymd_opt(2024, 6, 29).unwrap());
/// ```
pub struct InvoiceBuilder {
    id: String,
    issue_date: NaiveDate,
    corrects: Option<String>,
    transaction: Option<Transaction>,
    classification: Option<Classification>,
    tax: Option<TaxCalculation>,
    provider: Option<Party>,
    customer: Option<Party>,
    payment_method: String,
    payment_status: PaymentStatus,
    notes: Vec<String>,
}

impl InvoiceBuilder {
    pub fn new(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            issue_date,
            corrects: None,
            transaction: None,
            classification: None,
            tax: None,
            provider: None,
            customer: None,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            payment_status: PaymentStatus::Paid,
            notes: Vec::new(),
        }
    }

    pub fn transaction(mut self, transaction: Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn tax(mut self, tax: TaxCalculation) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn provider(mut self, party: Party) -> Self {
        self.provider = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    /// Mark this invoice as a correction of an earlier one.
    pub fn corrects(mut self, original_id: impl Into<String>) -> Self {
        self.corrects = Some(original_id.into());
        self
    }

    /// Additional legal note, printed after the generated ones.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Build the invoice, checking identities and input consistency.
    /// Returns all identity problems at once (not just the first).
    pub fn build(self) -> Result<Invoice, LedgerError> {
        let transaction = self
            .transaction
            .ok_or_else(|| LedgerError::Builder("transaction is required".into()))?;
        let classification = self
            .classification
            .ok_or_else(|| LedgerError::Builder("classification is required".into()))?;
        let tax = self
            .tax
            .ok_or_else(|| LedgerError::Builder("tax calculation is required".into()))?;
        let provider = self
            .provider
            .ok_or_else(|| LedgerError::Builder("provider is required".into()))?;
        let customer = self
            .customer
            .ok_or_else(|| LedgerError::Builder("customer is required".into()))?;

        if self.id.trim().is_empty() {
            return Err(LedgerError::Builder("invoice id must not be empty".into()));
        }
        if self.id.len() > 200 {
            return Err(LedgerError::Builder(
                "invoice id cannot exceed 200 characters".into(),
            ));
        }
        if self.corrects.as_deref() == Some(self.id.as_str()) {
            return Err(LedgerError::Builder(
                "an invoice cannot correct itself".into(),
            ));
        }

        if tax.net_amount() != transaction.amount() || tax.currency() != transaction.currency() {
            return Err(LedgerError::Builder(format!(
                "tax calculation (net {} {}) does not belong to transaction {} ({} {})",
                tax.net_amount(),
                tax.currency(),
                transaction.id(),
                transaction.amount(),
                transaction.currency()
            )));
        }
        if classification.booking_account != classifier::booking_account(transaction.direction()) {
            return Err(LedgerError::Builder(format!(
                "classification account {} does not match a {} transaction",
                classification.booking_account.code(),
                transaction.direction()
            )));
        }

        let mut errors = validation::validate_party(&provider, "provider", false);
        errors.extend(validation::validate_provider_tax_ids(&provider, "provider"));
        errors.extend(validation::validate_party(&customer, "customer", true));
        into_result(errors)?;

        let due_date = self
            .issue_date
            .checked_add_days(Days::new(PAYMENT_TERM_DAYS))
            .ok_or_else(|| LedgerError::Builder("due date out of range".into()))?;

        let mut legal_notes = legal_notes(&provider, &tax, self.corrects.as_deref());
        legal_notes.extend(self.notes);

        let type_code = if self.corrects.is_some() {
            InvoiceTypeCode::Corrected
        } else {
            InvoiceTypeCode::Invoice
        };

        Ok(Invoice {
            id: self.id,
            type_code,
            corrects: self.corrects,
            issue_date: self.issue_date,
            service_date: transaction.completed_on(),
            service_description: service_description(transaction.service_type()),
            transaction,
            classification,
            tax,
            provider,
            customer,
            payment: Payment {
                method: self.payment_method,
                due_date,
                status: self.payment_status,
            },
            legal_notes,
        })
    }
}

/// Issue an invoice from its parts with default payment settings.
pub fn build_invoice(
    id: impl Into<String>,
    issue_date: NaiveDate,
    transaction: &Transaction,
    classification: &Classification,
    tax: &TaxCalculation,
    provider: &Party,
    customer: &Party,
) -> Result<Invoice, LedgerError> {
    InvoiceBuilder::new(id, issue_date)
        .transaction(transaction.clone())
        .classification(*classification)
        .tax(tax.clone())
        .provider(provider.clone())
        .customer(customer.clone())
        .build()
}

/// "automation_setup" → "Automation Setup Service".
pub fn service_description(service_type: &str) -> String {
    let spaced = service_type.replace('_', " ");
    let mut out = String::with_capacity(spaced.len() + 8);
    let mut prev_is_letter = false;
    for c in spaced.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out.push_str(" Service");
    out
}

fn legal_notes(provider: &Party, tax: &TaxCalculation, corrects: Option<&str>) -> Vec<String> {
    let mut notes = Vec::new();

    match (&provider.vat_id, &provider.tax_number) {
        (Some(vat_id), _) => notes.push(format!("Umsatzsteuer-ID: {vat_id}")),
        (None, Some(tax_number)) => notes.push(format!("Steuernummer: {tax_number}")),
        (None, None) => {}
    }

    if tax.is_exempt() {
        notes.push("Kein Ausweis der Umsatzsteuer gemäß § 19 UStG (Kleinunternehmerregelung)".into());
    } else {
        notes.push("Kleinunternehmerregelung nicht anwendbar".into());
    }

    match &provider.trading_name {
        Some(trading) => notes.push(format!("Leistung erbracht von {}, {trading}", provider.name)),
        None => notes.push(format!("Leistung erbracht von {}", provider.name)),
    }

    if let Some(original) = corrects {
        notes.push(format!("Korrektur der Rechnung {original}"));
    }

    notes
}

/// Builder for [`Party`] (provider or customer).
pub struct PartyBuilder {
    name: String,
    trading_name: Option<String>,
    address: Option<Address>,
    email: Option<String>,
    tax_number: Option<String>,
    vat_id: Option<String>,
    reference: Option<String>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trading_name: None,
            address: None,
            email: None,
            tax_number: None,
            vat_id: None,
            reference: None,
        }
    }

    pub fn trading_name(mut self, name: impl Into<String>) -> Self {
        self.trading_name = Some(name.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn tax_number(mut self, num: impl Into<String>) -> Self {
        self.tax_number = Some(num.into());
        self
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.vat_id = Some(id.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            trading_name: self.trading_name,
            address: self.address,
            email: self.email,
            tax_number: self.tax_number,
            vat_id: self.vat_id,
            reference: self.reference,
        }
    }
}

/// Builder for [`Address`].
pub struct AddressBuilder {
    street: Option<String>,
    postal_code: String,
    city: String,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            postal_code: postal_code.into(),
            city: city.into(),
            country_code: country_code.into(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            postal_code: self.postal_code,
            city: self.city,
            country_code: self.country_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute_amount;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn description_title_cases() {
        assert_eq!(service_description("automation_setup"), "Automation Setup Service");
        assert_eq!(service_description("SEO consulting"), "Seo Consulting Service");
        assert_eq!(service_description("e-mail_marketing"), "E-Mail Marketing Service");
    }

    #[test]
    fn exempt_note() {
        let provider = PartyBuilder::new("Erika Muster").tax_number("2181508150").build();
        let tax = compute_amount(dec!(10), Decimal::ZERO).unwrap();
        let notes = legal_notes(&provider, &tax, None);
        assert_eq!(notes[0], "Steuernummer: 2181508150");
        assert!(notes[1].contains("§ 19 UStG"));
        assert_eq!(notes[2], "Leistung erbracht von Erika Muster");
    }
}
