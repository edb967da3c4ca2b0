use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Default invoice id prefix.
pub const DEFAULT_INVOICE_PREFIX: &str = "ZZL-";

/// Default length of the random id suffix (hex characters).
pub const DEFAULT_SUFFIX_LEN: usize = 12;

/// Invoice id generator.
///
/// Generates ids in the format `{prefix}{YYYYMMDD}-{suffix}`,
/// e.g. "ZZL-20240615-3F2A9C01B7D4", where the suffix is taken from a
/// random v4 UUID. Ids are not sequential; uniqueness within a store is
/// enforced by the store's insert-once contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawInvoiceIdGenerator")]
pub struct InvoiceIdGenerator {
    prefix: String,
    suffix_len: usize,
}

/// Unchecked wire form; converted through [`InvoiceIdGenerator::with_suffix_len`].
#[derive(Deserialize)]
struct RawInvoiceIdGenerator {
    prefix: String,
    #[serde(default = "default_suffix_len")]
    suffix_len: usize,
}

fn default_suffix_len() -> usize {
    DEFAULT_SUFFIX_LEN
}

impl TryFrom<RawInvoiceIdGenerator> for InvoiceIdGenerator {
    type Error = LedgerError;

    fn try_from(raw: RawInvoiceIdGenerator) -> Result<Self, Self::Error> {
        InvoiceIdGenerator::new(raw.prefix).with_suffix_len(raw.suffix_len)
    }
}

impl Default for InvoiceIdGenerator {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }
}

impl InvoiceIdGenerator {
    /// Create a generator with the default 12-character suffix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }

    /// Set the suffix length (4 to 32 hex characters).
    pub fn with_suffix_len(mut self, len: usize) -> Result<Self, LedgerError> {
        if !(4..=32).contains(&len) {
            return Err(LedgerError::Builder(format!(
                "invoice id suffix length must be between 4 and 32, got {len}"
            )));
        }
        self.suffix_len = len;
        Ok(self)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    /// Generate a fresh id for an invoice issued on `date`.
    pub fn next_id(&self, date: NaiveDate) -> String {
        let uuid = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        format!(
            "{}{}-{}",
            self.prefix,
            date.format("%Y%m%d"),
            &uuid[..self.suffix_len.min(uuid.len())]
        )
    }

    /// True if `id` has the shape this generator produces.
    pub fn matches(&self, id: &str) -> bool {
        let Some(rest) = id.strip_prefix(&self.prefix) else {
            return false;
        };
        let Some((date, suffix)) = rest.split_once('-') else {
            return false;
        };
        NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
            && date.len() == 8
            && suffix.len() == self.suffix_len
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }
}
