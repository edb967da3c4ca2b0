use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use steuerbuch::estimate::*;
use tracing_subscriber::EnvFilter;

fn document(
    kind: DocumentKind,
    amount: Decimal,
    month: u32,
    description: &str,
    deductible: bool,
) -> TaxDocument {
    TaxDocument {
        kind,
        amount,
        date: NaiveDate::from_ymd_opt(2024, month, 15).unwrap(),
        description: description.into(),
        category: None,
        vat_rate: Some(dec!(0.19)),
        deductible,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = EstimatorConfig::default();

    // Quick estimate for a single profit figure
    let quick = estimate(dec!(70000), Decimal::ZERO, &config);
    println!("Profit {}:", quick.profit);
    println!("  income tax            {:>10}", quick.income_tax);
    println!("  trade tax             {:>10}", quick.business_tax);
    println!("  solidarity surcharge  {:>10}", quick.solidarity_surcharge);
    println!("  total                 {:>10}", quick.total);

    let documents = vec![
        document(DocumentKind::Income, dec!(48000), 3, "Automatisierung Q1", false),
        document(DocumentKind::Income, dec!(52000), 9, "Beratung Q3", false),
        document(DocumentKind::Receipt, dec!(6400), 5, "Hardware", true),
        document(DocumentKind::Expense, dec!(3600), 11, "Software-Abos", true),
        // Previous year, ignored
        TaxDocument {
            date: NaiveDate::from_ymd_opt(2023, 12, 20).unwrap(),
            ..document(DocumentKind::Income, dec!(9000), 1, "Altjahr", false)
        },
    ];

    let report = annual_report(2024, &documents, &config);
    println!("\nAnnual report {} ({} documents)", report.year, report.documents_processed);
    println!("  income     {:>10}", report.total_income);
    println!("  expenses   {:>10}", report.total_expenses);
    println!("  profit     {:>10}", report.profit());
    println!("  input VAT  {:>10}", report.input_vat);
    println!("  VAT due    {:>10}", report.estimate.vat_due);
    println!("  total      {:>10}", report.estimate.total);
    for rec in &report.recommendations {
        println!("  - {rec}");
    }
}
