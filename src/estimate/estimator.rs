use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::round_half_up;

/// Thresholds and rates for the advisory tax estimate.
///
/// The income-tax figure applies one flat rate to the whole profit
/// depending on its bracket. This is an approximation, not the marginal
/// tariff of § 32a EStG, and the figures it reports are advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Grundfreibetrag.
    pub basic_allowance: Decimal,
    pub upper_threshold: Decimal,
    pub entry_rate: Decimal,
    pub top_rate: Decimal,
    /// Gewerbesteuer-Freibetrag.
    pub trade_tax_allowance: Decimal,
    pub trade_tax_rate: Decimal,
    pub solidarity_threshold: Decimal,
    pub solidarity_rate: Decimal,
    /// Revenue up to which no VAT is due (Kleinunternehmer).
    pub small_business_limit: Decimal,
    pub vat_rate: Decimal,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            basic_allowance: dec!(9984),
            upper_threshold: dec!(58596),
            entry_rate: dec!(0.14),
            top_rate: dec!(0.42),
            trade_tax_allowance: dec!(24500),
            trade_tax_rate: dec!(0.035),
            solidarity_threshold: dec!(972),
            solidarity_rate: dec!(0.055),
            small_business_limit: dec!(22000),
            vat_rate: dec!(0.19),
        }
    }
}

/// Advisory annual tax figures, each rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEstimate {
    pub profit: Decimal,
    pub income_tax: Decimal,
    pub business_tax: Decimal,
    pub solidarity_surcharge: Decimal,
    pub vat_due: Decimal,
    /// Sum of the four figures above.
    pub total: Decimal,
}

/// Income tax on an annual profit, flat per bracket.
pub fn income_tax(profit: Decimal, config: &EstimatorConfig) -> Decimal {
    let tax = if profit <= config.basic_allowance {
        Decimal::ZERO
    } else if profit <= config.upper_threshold {
        profit * config.entry_rate
    } else {
        profit * config.top_rate
    };
    round_half_up(tax, 2)
}

/// Trade tax on the profit above the allowance.
pub fn business_tax(profit: Decimal, config: &EstimatorConfig) -> Decimal {
    let taxable = profit - config.trade_tax_allowance;
    if taxable <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(taxable * config.trade_tax_rate, 2)
}

/// Solidarity surcharge, levied only above the threshold.
pub fn solidarity_surcharge(income_tax: Decimal, config: &EstimatorConfig) -> Decimal {
    if income_tax > config.solidarity_threshold {
        round_half_up(income_tax * config.solidarity_rate, 2)
    } else {
        Decimal::ZERO
    }
}

/// Full estimate for an annual profit plus the VAT still due.
///
/// ```
/// use steuerbuch::estimate::{EstimatorConfig, estimate};
/// use rust_decimal_macros::dec;
///
/// let e = estimate(dec!(70000), dec!(0), &EstimatorConfig::default());
/// assert_eq!(e.income_tax, dec!(29400.00));
/// assert_eq!(e.business_tax, dec!(1592.50));
/// assert_eq!(e.solidarity_surcharge, dec!(1617.00));
/// assert_eq!(e.total, dec!(32609.50));
/// ```
pub fn estimate(profit: Decimal, vat_due: Decimal, config: &EstimatorConfig) -> TaxEstimate {
    let income = income_tax(profit, config);
    let business = business_tax(profit, config);
    let solidarity = solidarity_surcharge(income, config);
    let vat_due = round_half_up(vat_due, 2);
    TaxEstimate {
        profit: round_half_up(profit, 2),
        income_tax: income,
        business_tax: business,
        solidarity_surcharge: solidarity,
        vat_due,
        total: income + business + solidarity + vat_due,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets() {
        let c = EstimatorConfig::default();
        assert_eq!(income_tax(dec!(9984), &c), Decimal::ZERO);
        assert_eq!(income_tax(dec!(9985), &c), dec!(1397.90));
        assert_eq!(income_tax(dec!(58596), &c), dec!(8203.44));
        assert_eq!(income_tax(dec!(58597), &c), dec!(24610.74));
        assert_eq!(income_tax(dec!(-500), &c), Decimal::ZERO);
    }

    #[test]
    fn business_tax_allowance() {
        let c = EstimatorConfig::default();
        assert_eq!(business_tax(dec!(24500), &c), Decimal::ZERO);
        assert_eq!(business_tax(dec!(10000), &c), Decimal::ZERO);
        assert_eq!(business_tax(dec!(34500), &c), dec!(350.00));
    }

    #[test]
    fn solidarity_threshold_is_exclusive() {
        let c = EstimatorConfig::default();
        assert_eq!(solidarity_surcharge(dec!(972), &c), Decimal::ZERO);
        assert_eq!(solidarity_surcharge(dec!(1000), &c), dec!(55.00));
    }

    #[test]
    fn total_includes_vat_due() {
        let e = estimate(dec!(20000), dec!(1234.567), &EstimatorConfig::default());
        assert_eq!(e.income_tax, dec!(2800.00));
        assert_eq!(e.business_tax, Decimal::ZERO);
        assert_eq!(e.solidarity_surcharge, dec!(154.00));
        assert_eq!(e.vat_due, dec!(1234.57));
        assert_eq!(e.total, dec!(2800.00) + dec!(154.00) + dec!(1234.57));
    }

    #[test]
    fn config_deserializes_partially() {
        let c: EstimatorConfig = serde_json::from_str(r#"{"top_rate":"0.45"}"#).unwrap();
        assert_eq!(c.top_rate, dec!(0.45));
        assert_eq!(c.basic_allowance, dec!(9984));
    }
}
