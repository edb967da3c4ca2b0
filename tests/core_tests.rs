#![cfg(feature = "core")]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use steuerbuch::core::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(10, 30, 0).unwrap()
}

fn provider() -> Party {
    PartyBuilder::new("Erika Muster")
        .trading_name("Muster Digital")
        .address(
            AddressBuilder::new("Zeitz", "06712", "DE")
                .street("Hauptstraße 1")
                .build(),
        )
        .email("erika@example.de")
        .vat_id("DE123456789")
        .build()
}

fn customer() -> Party {
    PartyBuilder::new("Kunde AG")
        .reference("K-1001")
        .email("einkauf@kunde.example")
        .build()
}

fn income(id: &str, amount: Decimal, service_type: &str) -> Transaction {
    Transaction::new(id, amount, Direction::Income, service_type, at(2024, 6, 15)).unwrap()
}

fn issue(tx: &Transaction) -> Result<Invoice, LedgerError> {
    let tax = compute_standard(tx)?;
    build_invoice(
        "ZZL-20240615-0123456789AB",
        date(2024, 6, 15),
        tx,
        &classify(tx),
        &tax,
        &provider(),
        &customer(),
    )
}

// --- Calculator ---

#[test]
fn scenario_standard_rate_income() {
    let tx = income("tx-1", dec!(1000.00), "consulting").with_vat_rate(dec!(0.19)).unwrap();
    let calc = compute_standard(&tx).unwrap();
    assert_eq!(calc.net_amount(), dec!(1000.00));
    assert_eq!(calc.vat_amount(), dec!(190.00));
    assert_eq!(calc.gross_amount(), dec!(1190.00));
    assert_eq!(calc.currency(), "EUR");
}

#[test]
fn exempt_rate_yields_zero_vat() {
    let tx = income("tx-2", dec!(250.00), "consulting").with_vat_rate(Decimal::ZERO).unwrap();
    let calc = compute_standard(&tx).unwrap();
    assert_eq!(calc.vat_amount(), Decimal::ZERO);
    assert_eq!(calc.gross_amount(), calc.net_amount());
    assert!(calc.is_exempt());
}

#[test]
fn vat_rounds_half_away_from_zero() {
    // 0.05 * 0.19 = 0.0095 -> 0.01
    let calc = compute_amount(dec!(0.05), dec!(0.19)).unwrap();
    assert_eq!(calc.vat_amount(), dec!(0.01));
    // 0.25 * 0.5 = 0.125, a tie that banker's rounding would send to 0.12
    let calc = compute_amount(dec!(0.25), dec!(0.5)).unwrap();
    assert_eq!(calc.vat_amount(), dec!(0.13));
    assert_eq!(calc.gross_amount(), dec!(0.38));
}

#[test]
fn invalid_amount_and_rate() {
    assert!(matches!(
        compute_amount(Decimal::ZERO, dec!(0.19)),
        Err(LedgerError::InvalidAmount(_))
    ));
    assert!(matches!(
        compute_amount(dec!(10), dec!(-0.01)),
        Err(LedgerError::InvalidRate(_))
    ));
    assert!(matches!(
        compute_amount(dec!(10), dec!(1.01)),
        Err(LedgerError::InvalidRate(_))
    ));
    assert!(compute_amount(dec!(10), Decimal::ONE).is_ok());
}

#[test]
fn transaction_rejects_non_positive_amount() {
    let err = Transaction::new("t", dec!(-1), Direction::Income, "x", at(2024, 1, 1)).unwrap_err();
    assert!(err.is_validation());
}

// --- Classifier ---

#[test]
fn scenario_automation_expense() {
    let tx = Transaction::new(
        "tx-3",
        dec!(49.99),
        Direction::Expense,
        "automation setup",
        at(2024, 6, 15),
    )
    .unwrap();
    let c = classify(&tx);
    assert_eq!(c.tax_category.to_string(), "IT service");
    assert!(c.deductible);
    assert_eq!(c.booking_account.code(), "4920");
    assert_eq!(c.booking_account.name(), "Sonstige betriebliche Aufwendungen");
}

#[test]
fn income_books_to_service_revenue() {
    let c = classify(&income("tx-4", dec!(10), "Social Media Marketing"));
    assert_eq!(c.tax_category, ServiceCategory::MarketingService);
    assert!(!c.deductible);
    assert_eq!(c.booking_account.number(), 8400);
}

// --- Request validation ---

#[test]
fn direction_parsing() {
    assert_eq!(" Income ".parse::<Direction>().unwrap(), Direction::Income);
    assert_eq!("EXPENSE".parse::<Direction>().unwrap(), Direction::Expense);
    assert!("refund".parse::<Direction>().unwrap_err().is_validation());
}

#[test]
fn request_from_json() {
    let json = r#"{
        "transaction_id": "pp-7781",
        "amount": "99.00",
        "direction": "income",
        "service_type": "automation_setup",
        "completed_at": "2024-06-15T18:20:00"
    }"#;
    let req: TransactionRequest = serde_json::from_str(json).unwrap();
    let tx = validate_transaction(&req, &[dec!(0), dec!(0.19)]).unwrap();
    assert_eq!(tx.id(), "pp-7781");
    assert_eq!(tx.amount(), dec!(99.00));
    assert_eq!(tx.completed_on(), date(2024, 6, 15));
}

#[test]
fn transaction_deserialization_revalidates() {
    let json = r#"{"id":"t","amount":"-5","currency":"EUR","direction":"income",
        "service_type":"x","vat_rate":null,"completed_at":"2024-06-15T00:00:00"}"#;
    assert!(serde_json::from_str::<Transaction>(json).is_err());

    let json = r#"{"id":"t","amount":"5","currency":"USD","direction":"income",
        "service_type":"x","vat_rate":null,"completed_at":"2024-06-15T00:00:00"}"#;
    assert!(serde_json::from_str::<Transaction>(json).is_err());
}

// --- Invoice builder ---

#[test]
fn invoice_embeds_copies_and_totals() {
    let tx = income("tx-5", dec!(1000.00), "automation_setup");
    let invoice = issue(&tx).unwrap();

    assert_eq!(invoice.transaction, tx);
    assert_eq!(invoice.transaction_id(), "tx-5");
    assert_eq!(invoice.net_amount(), dec!(1000.00));
    assert_eq!(invoice.vat_amount(), dec!(190.00));
    assert_eq!(invoice.gross_amount(), dec!(1190.00));
    assert_eq!(invoice.service_description, "Automation Setup Service");
    assert_eq!(invoice.service_date, date(2024, 6, 15));
    assert_eq!(invoice.payment.due_date, date(2024, 6, 29));
    assert_eq!(invoice.payment.method, "paypal");
    assert_eq!(invoice.payment.status, PaymentStatus::Paid);
    assert_eq!(invoice.type_code, InvoiceTypeCode::Invoice);
    assert!(invoice.is_income());
}

#[test]
fn invoice_legal_notes() {
    let invoice = issue(&income("tx-6", dec!(100), "consulting")).unwrap();
    assert_eq!(
        invoice.legal_notes,
        vec![
            "Umsatzsteuer-ID: DE123456789".to_string(),
            "Kleinunternehmerregelung nicht anwendbar".to_string(),
            "Leistung erbracht von Erika Muster, Muster Digital".to_string(),
        ]
    );
}

#[test]
fn provider_without_tax_identity_is_rejected() {
    let tx = income("tx-7", dec!(100), "consulting");
    let tax = compute_standard(&tx).unwrap();
    let err = build_invoice(
        "ZZL-1",
        date(2024, 6, 15),
        &tx,
        &classify(&tx),
        &tax,
        &PartyBuilder::new("Erika Muster").build(),
        &customer(),
    )
    .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("provider"));
}

#[test]
fn blank_customer_reference_is_rejected() {
    let tx = income("tx-8", dec!(100), "consulting");
    let tax = compute_standard(&tx).unwrap();
    let err = build_invoice(
        "ZZL-1",
        date(2024, 6, 15),
        &tx,
        &classify(&tx),
        &tax,
        &provider(),
        &PartyBuilder::new("Kunde AG").reference("   ").build(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("customer.reference"));
}

#[test]
fn all_identity_problems_reported_together() {
    let tx = income("tx-9", dec!(100), "consulting");
    let tax = compute_standard(&tx).unwrap();
    let err = build_invoice(
        "ZZL-1",
        date(2024, 6, 15),
        &tx,
        &classify(&tx),
        &tax,
        &PartyBuilder::new(" ").vat_id("DE012345678").build(),
        &PartyBuilder::new("").build(),
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("provider.name"));
    assert!(msg.contains("provider.vat_id"));
    assert!(msg.contains("customer.name"));
    assert!(msg.contains("customer.reference"));
}

#[test]
fn foreign_tax_calculation_is_rejected() {
    let tx = income("tx-10", dec!(100), "consulting");
    let other = compute_amount(dec!(99.99), dec!(0.19)).unwrap();
    let err = build_invoice(
        "ZZL-1",
        date(2024, 6, 15),
        &tx,
        &classify(&tx),
        &other,
        &provider(),
        &customer(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Builder(_)));
}

#[test]
fn correction_invoice() {
    let tx = income("tx-11", dec!(100), "consulting");
    let invoice = InvoiceBuilder::new("ZZL-20240616-AAAAAAAAAAAA", date(2024, 6, 16))
        .transaction(tx.clone())
        .classification(classify(&tx))
        .tax(compute_standard(&tx).unwrap())
        .provider(provider())
        .customer(customer())
        .corrects("ZZL-20240615-0123456789AB")
        .build()
        .unwrap();
    assert_eq!(invoice.type_code, InvoiceTypeCode::Corrected);
    assert_eq!(invoice.type_code.code(), 384);
    assert_eq!(
        invoice.legal_notes.last().map(String::as_str),
        Some("Korrektur der Rechnung ZZL-20240615-0123456789AB")
    );
}

#[test]
fn missing_builder_inputs() {
    let err = InvoiceBuilder::new("ZZL-1", date(2024, 6, 15)).build().unwrap_err();
    assert!(matches!(err, LedgerError::Builder(_)));
}

#[test]
fn invoice_json_shape() {
    let invoice = issue(&income("tx-12", dec!(1000.00), "consulting")).unwrap();
    let json = serde_json::to_value(&invoice).unwrap();
    assert_eq!(json["tax"]["vat_amount"], "190.00");
    assert_eq!(json["tax"]["gross_amount"], "1190.00");
    assert_eq!(json["transaction"]["direction"], "income");
    assert_eq!(json["classification"]["booking_account"], "8400");

    let back: Invoice = serde_json::from_value(json).unwrap();
    assert_eq!(back, invoice);
}

// --- Invoice ids ---

#[test]
fn generated_ids_have_expected_shape() {
    let ids = InvoiceIdGenerator::default();
    let id = ids.next_id(date(2024, 6, 15));
    assert!(id.starts_with("ZZL-20240615-"));
    assert!(ids.matches(&id));
}
