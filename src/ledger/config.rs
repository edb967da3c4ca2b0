use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::{
    DEFAULT_PAYMENT_METHOD, InvoiceIdGenerator, LedgerError, Party, STANDARD_VAT_RATE,
    ValidationError, into_result, validate_party, validate_provider_tax_ids,
};

/// VAT rates accepted on incoming transactions by default.
pub const DEFAULT_ALLOWED_VAT_RATES: [Decimal; 2] = [dec!(0), dec!(0.19)];

/// Settings for the sale pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Issuer of every invoice.
    pub provider: Party,
    #[serde(default)]
    pub invoice_ids: InvoiceIdGenerator,
    #[serde(default = "default_allowed_rates")]
    pub allowed_vat_rates: Vec<Decimal>,
    /// Applied when a transaction carries no override.
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,
    #[serde(default = "default_payment_method")]
    pub default_payment_method: String,
}

fn default_allowed_rates() -> Vec<Decimal> {
    DEFAULT_ALLOWED_VAT_RATES.to_vec()
}

fn default_vat_rate() -> Decimal {
    STANDARD_VAT_RATE
}

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

impl LedgerConfig {
    pub fn new(provider: Party) -> Self {
        Self {
            provider,
            invoice_ids: InvoiceIdGenerator::default(),
            allowed_vat_rates: default_allowed_rates(),
            default_vat_rate: default_vat_rate(),
            default_payment_method: default_payment_method(),
        }
    }

    /// Check the provider identity and the rate settings.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut errors = validate_party(&self.provider, "provider", false);
        errors.extend(validate_provider_tax_ids(&self.provider, "provider"));
        if self.allowed_vat_rates.is_empty() {
            errors.push(ValidationError::new(
                "allowed_vat_rates",
                "at least one rate is required",
            ));
        }
        for rate in &self.allowed_vat_rates {
            if *rate < Decimal::ZERO || *rate > Decimal::ONE {
                errors.push(ValidationError::new(
                    "allowed_vat_rates",
                    format!("{rate} is outside 0..=1"),
                ));
            }
        }
        if !self.allowed_vat_rates.contains(&self.default_vat_rate) {
            errors.push(ValidationError::new(
                "default_vat_rate",
                format!("{} is not an allowed rate", self.default_vat_rate),
            ));
        }
        if self.default_payment_method.trim().is_empty() {
            errors.push(ValidationError::new(
                "default_payment_method",
                "must not be empty",
            ));
        }
        into_result(errors)
    }
}

/// Builder for [`LedgerConfig`].
pub struct LedgerConfigBuilder {
    config: LedgerConfig,
}

impl LedgerConfigBuilder {
    /// Start from the defaults for `provider`.
    pub fn new(provider: Party) -> Self {
        Self {
            config: LedgerConfig::new(provider),
        }
    }

    /// Use the default generator with a different prefix.
    pub fn invoice_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.invoice_ids = InvoiceIdGenerator::new(prefix);
        self
    }

    /// Replace the invoice id generator.
    pub fn invoice_ids(mut self, generator: InvoiceIdGenerator) -> Self {
        self.config.invoice_ids = generator;
        self
    }

    /// Set the VAT rates accepted on incoming transactions.
    pub fn allowed_vat_rates(mut self, rates: Vec<Decimal>) -> Self {
        self.config.allowed_vat_rates = rates;
        self
    }

    /// Set the rate used when a transaction has no override. Must be allowed.
    pub fn default_vat_rate(mut self, rate: Decimal) -> Self {
        self.config.default_vat_rate = rate;
        self
    }

    /// Set the payment method printed when a sale names none.
    pub fn default_payment_method(mut self, method: impl Into<String>) -> Self {
        self.config.default_payment_method = method.into();
        self
    }

    /// Build the configuration. `SaleProcessor::new` validates it.
    pub fn build(self) -> LedgerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PartyBuilder;

    fn provider() -> Party {
        PartyBuilder::new("Erika Muster").vat_id("DE123456789").build()
    }

    #[test]
    fn defaults() {
        let config = LedgerConfigBuilder::new(provider()).build();
        assert_eq!(config.invoice_ids.prefix(), "ZZL-");
        assert_eq!(config.allowed_vat_rates, vec![dec!(0), dec!(0.19)]);
        assert_eq!(config.default_payment_method, "paypal");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_rate_must_be_allowed() {
        let config = LedgerConfigBuilder::new(provider())
            .default_vat_rate(dec!(0.07))
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_vat_rate"));
    }

    #[test]
    fn provider_without_tax_identity_is_invalid() {
        let config = LedgerConfigBuilder::new(PartyBuilder::new("Erika Muster").build()).build();
        assert!(config.validate().unwrap_err().is_validation());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"provider":{"name":"Erika Muster","vat_id":"DE123456789"}}"#;
        let config: LedgerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.default_vat_rate, dec!(0.19));
        assert_eq!(config.invoice_ids.prefix(), "ZZL-");
    }
}
