use chrono::NaiveDate;
use rust_decimal_macros::dec;
use steuerbuch::core::*;
use steuerbuch::datev::*;
use steuerbuch::ledger::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let provider = PartyBuilder::new("Erika Muster")
        .vat_id("DE123456789")
        .build();
    let store = MemoryStore::new();
    let processor = SaleProcessor::new(&store, LedgerConfigBuilder::new(provider).build()).unwrap();

    for (n, (amount, service)) in [
        (dec!(1500.00), "automation_setup"),
        (dec!(800.00), "consulting"),
        (dec!(240.00), "marketing_audit"),
    ]
    .into_iter()
    .enumerate()
    {
        let request = SaleRequest {
            transaction: TransactionRequest {
                transaction_id: Some(format!("tx-{n}")),
                amount,
                currency: None,
                direction: "income".into(),
                service_type: service.into(),
                vat_rate: None,
                completed_at: NaiveDate::from_ymd_opt(2024, 3, 5 + n as u32 * 7)
                    .unwrap()
                    .and_hms_opt(11, 0, 0)
                    .unwrap(),
            },
            customer: PartyBuilder::new("Kunde AG").reference("K-1001").build(),
            payment_method: None,
            corrects: None,
        };
        if let Err(e) = processor.complete_sale(&request) {
            eprintln!("sale {n} rejected: {e}");
        }
    }

    let invoices = store
        .invoices_between(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();

    let config = DatevConfigBuilder::new(29098, 55003)
        .fiscal_year_start(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .exported_by("steuerbuch")
        .description("Ausgangsrechnungen 03/2024")
        .build();

    match to_extf(&invoices, &config) {
        Ok(csv) => print!("{csv}"),
        Err(e) => eprintln!("export failed: {e}"),
    }
}
