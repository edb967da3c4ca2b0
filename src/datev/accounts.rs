//! SKR03 / SKR04 account mappings for the ledger's booking accounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{BookingAccount, LedgerError, STANDARD_VAT_RATE, TaxCalculation};

/// Standard German chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ChartOfAccounts {
    /// Standardkontenrahmen 03 (most common for sole proprietors).
    SKR03,
    /// Standardkontenrahmen 04.
    SKR04,
}

impl ChartOfAccounts {
    /// SKR identifier for the EXTF header.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SKR03 => "03",
            Self::SKR04 => "04",
        }
    }
}

/// DATEV BU-Schlüssel (tax posting key), field 9 of the Buchungsstapel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuSchluessel(pub u8);

impl BuSchluessel {
    /// VSt 19% (input tax, standard rate).
    pub const VST_19: Self = Self(9);
}

/// Contra account for one posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMapping {
    /// Erlöskonto / Aufwandskonto.
    pub account: u32,
    /// Automatikkonten apply the tax themselves, so no BU key is written.
    pub is_automatik: bool,
    pub bu_key: Option<BuSchluessel>,
}

/// Map a booking account and its VAT rate onto the chart.
///
/// Exempt revenue goes to the Kleinunternehmer account. Rates other than
/// 0 and 19 % have no mapping.
pub fn contra_account(
    chart: ChartOfAccounts,
    booking: BookingAccount,
    tax: &TaxCalculation,
) -> Result<AccountMapping, LedgerError> {
    let rate = tax.vat_rate();
    if !is_mappable_rate(rate) {
        return Err(LedgerError::Builder(format!(
            "no DATEV account for VAT rate {rate}"
        )));
    }

    let standard = rate == STANDARD_VAT_RATE;
    let mapping = match (booking, standard) {
        (BookingAccount::ServiceRevenue, true) => AccountMapping {
            account: revenue_number(chart),
            is_automatik: true,
            bu_key: None,
        },
        (BookingAccount::ServiceRevenue, false) => AccountMapping {
            account: small_business_number(chart),
            is_automatik: false,
            bu_key: None,
        },
        (BookingAccount::OperatingExpenses, true) => AccountMapping {
            account: expense_number(chart),
            is_automatik: false,
            bu_key: Some(BuSchluessel::VST_19),
        },
        (BookingAccount::OperatingExpenses, false) => AccountMapping {
            account: expense_number(chart),
            is_automatik: false,
            bu_key: None,
        },
    };
    Ok(mapping)
}

fn revenue_number(chart: ChartOfAccounts) -> u32 {
    match chart {
        ChartOfAccounts::SKR03 => BookingAccount::ServiceRevenue.number(),
        ChartOfAccounts::SKR04 => 4400,
    }
}

fn small_business_number(chart: ChartOfAccounts) -> u32 {
    match chart {
        ChartOfAccounts::SKR03 => 8190,
        ChartOfAccounts::SKR04 => 4190,
    }
}

fn expense_number(chart: ChartOfAccounts) -> u32 {
    match chart {
        ChartOfAccounts::SKR03 => BookingAccount::OperatingExpenses.number(),
        ChartOfAccounts::SKR04 => 6300,
    }
}

/// Named account entry for lookup.
#[derive(Debug, Clone)]
pub struct NamedAccount {
    pub number: u32,
    /// German account name.
    pub name: &'static str,
    pub is_automatik: bool,
}

const SKR03_ACCOUNTS: &[NamedAccount] = &[
    NamedAccount {
        number: 8400,
        name: "Erlöse aus Dienstleistungen 19% USt",
        is_automatik: true,
    },
    NamedAccount {
        number: 8190,
        name: "Erlöse Kleinunternehmer §19",
        is_automatik: false,
    },
    NamedAccount {
        number: 4920,
        name: "Sonstige betriebliche Aufwendungen",
        is_automatik: false,
    },
];

const SKR04_ACCOUNTS: &[NamedAccount] = &[
    NamedAccount {
        number: 4400,
        name: "Erlöse aus Dienstleistungen 19% USt",
        is_automatik: true,
    },
    NamedAccount {
        number: 4190,
        name: "Erlöse Kleinunternehmer §19",
        is_automatik: false,
    },
    NamedAccount {
        number: 6300,
        name: "Sonstige betriebliche Aufwendungen",
        is_automatik: false,
    },
];

fn accounts(chart: ChartOfAccounts) -> &'static [NamedAccount] {
    match chart {
        ChartOfAccounts::SKR03 => SKR03_ACCOUNTS,
        ChartOfAccounts::SKR04 => SKR04_ACCOUNTS,
    }
}

/// Look up an account by number.
pub fn account_by_number(chart: ChartOfAccounts, number: u32) -> Option<&'static NamedAccount> {
    accounts(chart).iter().find(|a| a.number == number)
}

/// Accounts whose name contains `search`, case-insensitive.
///
/// ```
/// use steuerbuch::datev::{ChartOfAccounts, account_by_name};
///
/// let found = account_by_name(ChartOfAccounts::SKR03, "kleinunternehmer");
/// assert_eq!(found[0].number, 8190);
/// ```
pub fn account_by_name(chart: ChartOfAccounts, search: &str) -> Vec<&'static NamedAccount> {
    let needle = search.to_lowercase();
    accounts(chart)
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&needle))
        .collect()
}

/// True if [`contra_account`] can map this VAT rate.
pub fn is_mappable_rate(rate: Decimal) -> bool {
    rate.is_zero() || rate == STANDARD_VAT_RATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute_amount;
    use rust_decimal_macros::dec;

    #[test]
    fn standard_revenue_is_automatik() {
        let tax = compute_amount(dec!(100), dec!(0.19)).unwrap();
        let m = contra_account(ChartOfAccounts::SKR03, BookingAccount::ServiceRevenue, &tax).unwrap();
        assert_eq!(m.account, 8400);
        assert!(m.is_automatik);
        assert_eq!(m.bu_key, None);

        let m = contra_account(ChartOfAccounts::SKR04, BookingAccount::ServiceRevenue, &tax).unwrap();
        assert_eq!(m.account, 4400);
    }

    #[test]
    fn exempt_revenue_uses_small_business_account() {
        let tax = compute_amount(dec!(100), dec!(0)).unwrap();
        let m = contra_account(ChartOfAccounts::SKR03, BookingAccount::ServiceRevenue, &tax).unwrap();
        assert_eq!(m.account, 8190);
        assert_eq!(m.bu_key, None);
    }

    #[test]
    fn expense_carries_input_tax_key() {
        let tax = compute_amount(dec!(100), dec!(0.19)).unwrap();
        let m = contra_account(ChartOfAccounts::SKR03, BookingAccount::OperatingExpenses, &tax).unwrap();
        assert_eq!(m.account, 4920);
        assert_eq!(m.bu_key, Some(BuSchluessel::VST_19));
    }

    #[test]
    fn reduced_rate_has_no_mapping() {
        let tax = compute_amount(dec!(100), dec!(0.07)).unwrap();
        assert!(!is_mappable_rate(dec!(0.07)));
        assert!(contra_account(ChartOfAccounts::SKR03, BookingAccount::ServiceRevenue, &tax).is_err());
    }

    #[test]
    fn lookup() {
        assert_eq!(
            account_by_number(ChartOfAccounts::SKR03, 4920).map(|a| a.name),
            Some("Sonstige betriebliche Aufwendungen")
        );
        assert!(account_by_number(ChartOfAccounts::SKR03, 1234).is_none());
        assert_eq!(account_by_name(ChartOfAccounts::SKR04, "ERLÖSE").len(), 2);
    }
}
