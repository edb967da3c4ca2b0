use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::LedgerError;
use super::types::{CURRENCY, TaxCalculation, Transaction};

/// German standard VAT rate (Umsatzsteuer), as a fraction.
pub const STANDARD_VAT_RATE: Decimal = dec!(0.19);

/// Compute net, VAT and gross for a transaction at the given rate.
///
/// VAT is rounded half away from zero to cents; gross is net plus the
/// *rounded* VAT so it always reconciles with the printed VAT line.
///
/// ```
/// use steuerbuch::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let at = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let tx = Transaction::new("tx-1", dec!(1000.00), Direction::Income, "consulting", at).unwrap();
/// let calc = compute(&tx, STANDARD_VAT_RATE).unwrap();
/// assert_eq!(calc.vat_amount(), dec!(190.00));
/// assert_eq!(calc.gross_amount(), dec!(1190.00));
/// ```
pub fn compute(transaction: &Transaction, vat_rate: Decimal) -> Result<TaxCalculation, LedgerError> {
    compute_amount(transaction.amount(), vat_rate)
}

/// Compute with the transaction's own VAT override, or the standard rate.
pub fn compute_standard(transaction: &Transaction) -> Result<TaxCalculation, LedgerError> {
    compute(
        transaction,
        transaction.vat_rate().unwrap_or(STANDARD_VAT_RATE),
    )
}

/// Compute the figures for a bare net amount.
pub fn compute_amount(net: Decimal, vat_rate: Decimal) -> Result<TaxCalculation, LedgerError> {
    if net <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(net));
    }
    if vat_rate < Decimal::ZERO || vat_rate > Decimal::ONE {
        return Err(LedgerError::InvalidRate(vat_rate));
    }

    let overflow = || LedgerError::Overflow(format!("net {net} at rate {vat_rate}"));
    let vat_amount = if vat_rate.is_zero() {
        Decimal::ZERO
    } else {
        round_half_up(net.checked_mul(vat_rate).ok_or_else(overflow)?, 2)
    };
    let gross_amount = net.checked_add(vat_amount).ok_or_else(overflow)?;

    Ok(TaxCalculation {
        net_amount: net,
        vat_rate,
        vat_amount,
        gross_amount,
        currency: CURRENCY.to_string(),
    })
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
