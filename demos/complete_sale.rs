use chrono::NaiveDate;
use rust_decimal_macros::dec;
use steuerbuch::core::*;
use steuerbuch::ledger::*;
use tracing_subscriber::EnvFilter;

fn sale(id: &str, amount: rust_decimal::Decimal, service_type: &str, day: u32) -> SaleRequest {
    SaleRequest {
        transaction: TransactionRequest {
            transaction_id: Some(id.into()),
            amount,
            currency: None,
            direction: "income".into(),
            service_type: service_type.into(),
            vat_rate: None,
            completed_at: NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        },
        customer: PartyBuilder::new("Kunde AG")
            .email("buchhaltung@kunde.example")
            .reference("K-1001")
            .build(),
        payment_method: None,
        corrects: None,
    }
}

fn main() {
    // RUST_LOG=steuerbuch=debug shows every store write
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("steuerbuch=info".parse().unwrap()))
        .init();

    let provider = PartyBuilder::new("Erika Muster")
        .trading_name("Muster Digital")
        .address(AddressBuilder::new("Berlin", "10115", "DE").street("Hauptstr. 1").build())
        .vat_id("DE123456789")
        .build();
    let config = LedgerConfigBuilder::new(provider.clone()).build();
    let store = MemoryStore::new();
    let processor = SaleProcessor::new(&store, config).unwrap();

    for request in [
        sale("tx-1001", dec!(1000.00), "automation_setup", 3),
        sale("tx-1002", dec!(450.00), "consulting", 3),
        sale("tx-1003", dec!(300.00), "marketing_campaign", 18),
    ] {
        match processor.complete_sale(&request) {
            Ok(processed) => {
                let inv = &processed.invoice;
                println!(
                    "{}  {:<22} net {:>8}  VAT {:>7}  gross {:>8}  due {}",
                    inv.id,
                    inv.service_description,
                    inv.net_amount(),
                    inv.vat_amount(),
                    inv.gross_amount(),
                    inv.payment.due_date,
                );
            }
            Err(e) => eprintln!("sale rejected: {e}"),
        }
    }

    // Same transaction again: returns the stored invoice, metrics untouched.
    let again = processor.complete_sale(&sale("tx-1001", dec!(1000.00), "automation_setup", 3));
    if let Ok(processed) = again {
        println!("\nresubmitted tx-1001, already processed: {}", processed.already_processed);
    }

    let june = month_summary(&store, 2024, 6).unwrap();
    println!(
        "\n{}: {} sales on {} days, net {}, VAT {}, average deal {}",
        june.period,
        june.transaction_count,
        june.active_days,
        june.net_revenue,
        june.vat_collected,
        june.average_deal_size(),
    );

    let vat_return = prepare_vat_return(&store, &provider, 2024, 6).unwrap();
    println!("VAT advance return {}: VAT {}", vat_return.period, vat_return.vat);

    let first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let report = reconcile(&store, first, last, false).unwrap();
    println!(
        "reconciled {} days: {}",
        report.checked_days,
        if report.is_consistent() { "consistent" } else { "drift found" }
    );
}
