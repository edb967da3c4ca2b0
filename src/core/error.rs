use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while booking, invoicing, or persisting transactions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    /// One or more input fields are malformed or out of range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transaction amount is zero or negative.
    #[error("invalid amount {0}: must be greater than zero")]
    InvalidAmount(Decimal),

    /// VAT rate outside `0..=1`.
    #[error("invalid VAT rate {0}: must be between 0 and 1")]
    InvalidRate(Decimal),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// An invoice with this id is already stored.
    #[error("invoice {0} already exists")]
    DuplicateInvoice(String),

    /// An invoice for this transaction is already stored.
    #[error("transaction {0} has already been invoiced")]
    DuplicateTransaction(String),

    /// A sum left the representable decimal range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// The store rejected or failed a read or write.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// True for errors caused by bad input rather than by the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidAmount(_) | Self::InvalidRate(_)
        )
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "customer.reference").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collapse collected field errors into one [`LedgerError::Validation`].
///
/// Returns `Ok(())` when the list is empty.
pub fn into_result(errors: Vec<ValidationError>) -> Result<(), LedgerError> {
    if errors.is_empty() {
        return Ok(());
    }
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    Err(LedgerError::Validation(msg))
}
