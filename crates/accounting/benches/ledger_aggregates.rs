use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use holdbook_accounting::{
    Account, Amount, Category, Direction, LedgerEntry, SimpleEntry, Transfer, post_simple,
    post_transfer, summarize,
};

/// Ledger with a revenue row, an expense row and a transfer pair per day.
fn ledger(days: usize) -> Vec<LedgerEntry> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let mut rows = Vec::with_capacity(days * 4);
    for (i, date) in start.iter_days().take(days).enumerate() {
        let account = Account::ALL[i % Account::ALL.len()];
        let revenue = SimpleEntry {
            date: Some(date),
            account,
            category: Category::Revenue,
            amount: Amount::new(1_000 + i as i64).expect("non-negative"),
            direction: Direction::Income,
            project: "retail".to_string(),
            comment: String::new(),
        };
        let expense = SimpleEntry {
            category: Category::Marketing,
            amount: Amount::new(250).expect("non-negative"),
            direction: Direction::Expense,
            ..revenue.clone()
        };
        let transfer = Transfer {
            date: Some(date),
            source: account,
            target: Account::Cash,
            amount: Amount::new(100).expect("non-negative"),
            comment: "float".to_string(),
        };
        rows.push(post_simple(&revenue, date).expect("valid entry"));
        rows.push(post_simple(&expense, date).expect("valid entry"));
        if account != Account::Cash {
            rows.extend(post_transfer(&transfer, date).expect("valid transfer"));
        }
    }
    rows
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for days in [30usize, 365, 3_650] {
        let rows = ledger(days);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(days), &rows, |b, rows| {
            b.iter(|| summarize(black_box(rows)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_summarize);
criterion_main!(benches);
