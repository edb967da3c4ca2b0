use super::types::{BookingAccount, Classification, Direction, ServiceCategory, Transaction};

/// Keyword rules, checked in order. The first match wins.
const CATEGORY_RULES: &[(&str, ServiceCategory)] = &[
    ("marketing", ServiceCategory::MarketingService),
    ("automation", ServiceCategory::ItService),
    ("consulting", ServiceCategory::ConsultingService),
];

/// Classify a transaction for bookkeeping.
///
/// Pure: the same transaction always yields the same classification.
pub fn classify(transaction: &Transaction) -> Classification {
    let direction = transaction.direction();
    Classification {
        tax_category: categorize(transaction.service_type()),
        deductible: direction == Direction::Expense,
        booking_account: booking_account(direction),
    }
}

/// Map a free-text service type to a tax category.
pub fn categorize(service_type: &str) -> ServiceCategory {
    let lower = service_type.to_lowercase();
    let mut matches = CATEGORY_RULES
        .iter()
        .filter(|(keyword, _)| lower.contains(*keyword));

    let Some((keyword, category)) = matches.next() else {
        return ServiceCategory::OtherService;
    };

    let shadowed: Vec<&str> = matches.map(|(k, _)| *k).collect();
    if !shadowed.is_empty() {
        tracing::warn!(
            service_type,
            chosen = keyword,
            ?shadowed,
            "service type matches several category keywords, using the first"
        );
    }
    *category
}

/// SKR03 account: revenue for income, other operating expenses otherwise.
pub fn booking_account(direction: Direction) -> BookingAccount {
    match direction {
        Direction::Income => BookingAccount::ServiceRevenue,
        Direction::Expense => BookingAccount::OperatingExpenses,
    }
}
