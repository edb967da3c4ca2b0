use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{LedgerError, ValidationError, into_result};
use super::types::*;

/// Transaction-shaped payload as it arrives at the request boundary.
///
/// Nothing here is trusted; [`validate_transaction`] turns it into a
/// [`Transaction`] or reports every problem at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Caller-supplied id; a v4 UUID is generated when absent.
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    /// Defaults to EUR when absent.
    #[serde(default)]
    pub currency: Option<String>,
    /// "income" or "expense".
    pub direction: String,
    pub service_type: String,
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
    pub completed_at: NaiveDateTime,
}

/// Validate a request and build the [`Transaction`].
///
/// `allowed_rates` is the set of VAT overrides accepted for this
/// jurisdiction (standard and exempt by default).
pub fn validate_transaction(
    request: &TransactionRequest,
    allowed_rates: &[Decimal],
) -> Result<Transaction, LedgerError> {
    let mut errors = Vec::new();

    if request.amount <= Decimal::ZERO {
        errors.push(ValidationError::new(
            "amount",
            format!("must be greater than zero, got {}", request.amount),
        ));
    } else if request.amount.round_dp(2) != request.amount {
        errors.push(ValidationError::new(
            "amount",
            format!("must not have more than 2 decimal places, got {}", request.amount),
        ));
    }

    if let Some(currency) = &request.currency {
        if currency.trim() != CURRENCY {
            errors.push(ValidationError::new(
                "currency",
                format!("'{currency}' is not supported, only {CURRENCY}"),
            ));
        }
    }

    let direction = match request.direction.parse::<Direction>() {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(ValidationError::new(
                "direction",
                format!(
                    "unknown value '{}', expected 'income' or 'expense'",
                    request.direction
                ),
            ));
            None
        }
    };

    if request.service_type.trim().is_empty() {
        errors.push(ValidationError::new(
            "service_type",
            "must not be empty",
        ));
    }

    if let Some(rate) = request.vat_rate {
        if !allowed_rates.contains(&rate) {
            let allowed = allowed_rates
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            errors.push(ValidationError::new(
                "vat_rate",
                format!("{rate} is not an allowed rate (allowed: {allowed})"),
            ));
        }
    }

    if let Some(id) = &request.transaction_id {
        if id.trim().is_empty() {
            errors.push(ValidationError::new(
                "transaction_id",
                "must not be blank when given",
            ));
        }
    }

    into_result(errors)?;

    // Every field was checked above, so these constructors only re-assert.
    let Some(direction) = direction else {
        return Err(LedgerError::Validation("direction: missing".into()));
    };
    let id = request
        .transaction_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let tx = Transaction::new(
        id,
        request.amount,
        direction,
        request.service_type.trim(),
        request.completed_at,
    )?;
    match request.vat_rate {
        Some(rate) => tx.with_vat_rate(rate),
        None => Ok(tx),
    }
}

/// Validate a party's identity fields.
///
/// `require_reference` is set for customers, who must be identifiable.
pub fn validate_party(party: &Party, prefix: &str, require_reference: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if party.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.name"),
            "name must not be empty",
        ));
    }

    if require_reference
        && party
            .reference
            .as_deref()
            .is_none_or(|r| r.trim().is_empty())
    {
        errors.push(ValidationError::new(
            format!("{prefix}.reference"),
            "customer reference is required",
        ));
    }

    if let Some(email) = &party.email {
        if !is_plausible_email(email) {
            errors.push(ValidationError::new(
                format!("{prefix}.email"),
                format!("'{email}' is not a valid e-mail address"),
            ));
        }
    }

    if let Some(address) = &party.address {
        validate_address(address, &format!("{prefix}.address"), &mut errors);
    }

    errors
}

/// Validate the seller's tax identity: at least one of Steuernummer or
/// USt-IdNr. must be present and well-formed (§14 Abs. 4 Nr. 2 UStG).
pub fn validate_provider_tax_ids(provider: &Party, prefix: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let tax_number = provider.tax_number.as_deref().filter(|s| !s.trim().is_empty());
    let vat_id = provider.vat_id.as_deref().filter(|s| !s.trim().is_empty());

    if tax_number.is_none() && vat_id.is_none() {
        errors.push(ValidationError::new(
            prefix,
            "provider must have either a VAT ID (USt-IdNr.) or tax number (Steuernummer)",
        ));
    }
    if let Some(tax_number) = tax_number {
        if let Err(reason) = check_steuernummer(tax_number) {
            errors.push(ValidationError::new(format!("{prefix}.tax_number"), reason));
        }
    }
    if let Some(vat_id) = vat_id {
        if let Err(reason) = check_vat_id(vat_id) {
            errors.push(ValidationError::new(format!("{prefix}.vat_id"), reason));
        }
    }

    errors
}

fn validate_address(address: &Address, prefix: &str, errors: &mut Vec<ValidationError>) {
    if address.city.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.city"),
            "city must not be empty",
        ));
    }
    if address.postal_code.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.postal_code"),
            "postal code must not be empty",
        ));
    } else if address.country_code == "DE"
        && (address.postal_code.len() != 5
            || !address.postal_code.chars().all(|c| c.is_ascii_digit()))
    {
        errors.push(ValidationError::new(
            format!("{prefix}.postal_code"),
            format!(
                "German postal code must be 5 digits, got '{}'",
                address.postal_code
            ),
        ));
    }
    if address.country_code.len() != 2
        || !address.country_code.chars().all(|c| c.is_ascii_uppercase())
    {
        errors.push(ValidationError::new(
            format!("{prefix}.country_code"),
            format!(
                "country code must be 2 upper-case letters (ISO 3166-1), got '{}'",
                address.country_code
            ),
        ));
    }
}

/// German VAT IDs: DE followed by exactly 9 digits, first digit not 0.
/// Other EU prefixes are only checked for shape.
fn check_vat_id(vat_id: &str) -> Result<(), String> {
    let compact: String = vat_id.chars().filter(|c| !c.is_whitespace()).collect();
    let (Some(country), Some(number)) = (compact.get(..2), compact.get(2..)) else {
        return Err(format!("'{vat_id}' too short, expected country code + identifier"));
    };
    if !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!(
            "must start with a 2-letter country code (e.g. DE, AT), got '{country}'"
        ));
    }
    if country == "DE" {
        if number.len() != 9
            || !number.chars().all(|c| c.is_ascii_digit())
            || number.starts_with('0')
        {
            return Err(format!(
                "German VAT ID must be DE followed by 9 digits (e.g. DE123456789), got '{vat_id}'"
            ));
        }
    } else if number.len() < 2 || !number.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("'{vat_id}' has a malformed identifier part"));
    }
    Ok(())
}

/// Steuernummer: 13 digits (ELSTER format) or 10-11 digits (state format),
/// separators ignored.
fn check_steuernummer(tax_number: &str) -> Result<(), String> {
    if tax_number
        .chars()
        .any(|c| !(c.is_ascii_digit() || c == ' ' || c == '/'))
    {
        return Err(format!(
            "tax number '{tax_number}' may only contain digits, spaces and '/'"
        ));
    }
    let digits = tax_number.chars().filter(|c| c.is_ascii_digit()).count();
    if digits == 13 || (10..=11).contains(&digits) {
        Ok(())
    } else {
        Err(format!(
            "tax number must have 13 digits (ELSTER) or 10-11 digits, got {digits}"
        ))
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
