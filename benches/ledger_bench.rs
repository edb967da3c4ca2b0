use chrono::{NaiveDate, NaiveDateTime};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use steuerbuch::core::*;
use steuerbuch::ledger::*;

fn completed_at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn provider() -> Party {
    PartyBuilder::new("Bench Digital")
        .vat_id("DE123456789")
        .build()
}

fn sale(n: usize) -> SaleRequest {
    SaleRequest {
        transaction: TransactionRequest {
            transaction_id: Some(format!("bench-{n}")),
            amount: dec!(1250.00),
            currency: None,
            direction: "income".into(),
            service_type: "automation_setup".into(),
            vat_rate: None,
            completed_at: completed_at((n % 28) as u32 + 1),
        },
        customer: PartyBuilder::new("Kunde AG").reference("K-1").build(),
        payment_method: None,
        corrects: None,
    }
}

fn bench_compute(c: &mut Criterion) {
    let tx = Transaction::new("t", dec!(1234.56), Direction::Income, "consulting", completed_at(1))
        .unwrap();
    c.bench_function("compute_standard", |b| {
        b.iter(|| black_box(compute_standard(black_box(&tx))));
    });
}

fn bench_classify(c: &mut Criterion) {
    let tx = Transaction::new("t", dec!(10), Direction::Income, "Marketing Automation", completed_at(1))
        .unwrap();
    c.bench_function("classify", |b| {
        b.iter(|| black_box(classify(black_box(&tx))));
    });
}

fn bench_complete_sale(c: &mut Criterion) {
    let processor = SaleProcessor::new(MemoryStore::new(), LedgerConfigBuilder::new(provider()).build()).unwrap();
    let mut n = 0usize;
    c.bench_function("complete_sale", |b| {
        b.iter(|| {
            n += 1;
            black_box(processor.complete_sale(&sale(n)))
        });
    });
}

fn bench_replayed_sale(c: &mut Criterion) {
    let processor = SaleProcessor::new(MemoryStore::new(), LedgerConfigBuilder::new(provider()).build()).unwrap();
    let request = sale(0);
    processor.complete_sale(&request).unwrap();
    c.bench_function("complete_sale_replayed", |b| {
        b.iter(|| black_box(processor.complete_sale(black_box(&request))));
    });
}

fn bench_reconcile_month(c: &mut Criterion) {
    let store = MemoryStore::new();
    let processor = SaleProcessor::new(&store, LedgerConfigBuilder::new(provider()).build()).unwrap();
    for n in 0..1000 {
        processor.complete_sale(&sale(n)).unwrap();
    }
    let from = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    c.bench_function("reconcile_1000_invoices", |b| {
        b.iter(|| black_box(reconcile(&store, from, to, false)));
    });
}

criterion_group!(
    benches,
    bench_compute,
    bench_classify,
    bench_complete_sale,
    bench_replayed_sale,
    bench_reconcile_month,
);
criterion_main!(benches);
