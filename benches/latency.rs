//! Latency benchmarks for single-wallet scoring operations.
//!
//! Run with: `cargo bench --bench latency`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use credit_core::normalize_values;
use credit_core::types::{FactorKind, NormalizedTransaction, StakingRecord, TransactionType};
use credit_scorer::{CreditScorer, ImprovementPlan, WalletActivity};

/// 2024-01-01T00:00:00Z
const NOW: i64 = 1_704_067_200;
const DAY: i64 = 86_400;
const WALLET: &str = "BenchWa11et111111111111111111111111111111111";

/// Generate a deterministic history with the given number of transactions.
fn generate_history(size: usize) -> Vec<NormalizedTransaction> {
    (0..size)
        .map(|i| {
            let amount = if i % 4 == 0 {
                Decimal::new(-(i as i64 % 17 + 1), 1)
            } else {
                Decimal::new(i as i64 % 23 + 1, 1)
            };
            let (currency, tx_type) = match i % 10 {
                0 => ("USDC", TransactionType::Swap),
                1 => ("SOL", TransactionType::Borrow),
                2 => ("SOL", TransactionType::Repay),
                _ => ("SOL", TransactionType::Transfer),
            };
            NormalizedTransaction::new(NOW - (i as i64 % 400) * DAY, amount, currency)
                .with_type(tx_type)
                .with_fee(Decimal::new(5, 6))
                .with_source(if i % 7 == 0 { "JUPITER" } else { "SYSTEM_PROGRAM" })
        })
        .collect()
}

fn generate_activity(size: usize) -> WalletActivity {
    WalletActivity::new(generate_history(size), NOW)
        .with_balance(Decimal::new(125, 1))
        .with_rate(Decimal::new(150, 0))
        .with_staking(vec![
            StakingRecord::new("v1", Decimal::from(20), NOW - 60 * DAY).with_name("Everstake"),
            StakingRecord::new("v2", Decimal::from(5), NOW - 10 * DAY),
        ])
}

/// Generate indexer-shaped records with nested native transfers.
fn generate_raw(size: usize) -> Vec<Value> {
    (0..size)
        .map(|i| {
            let incoming = i % 3 != 0;
            let (from, to) = if incoming { ("other", WALLET) } else { (WALLET, "other") };
            json!({
                "signature": format!("sig{}", i),
                "timestamp": NOW - (i as i64 % 400) * DAY,
                "type": "TRANSFER",
                "fee": 5000,
                "feePayer": WALLET,
                "nativeTransfers": [
                    {"fromUserAccount": from, "toUserAccount": to, "amount": 1_500_000_000u64}
                ]
            })
        })
        .collect()
}

/// Benchmark a full scoring pass.
fn bench_full_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_score");
    let scorer = CreditScorer::default();

    for size in [10, 100, 1000].iter() {
        let activity = generate_activity(*size);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("sequential", size),
            &activity,
            |b, activity| b.iter(|| black_box(scorer.score(black_box(activity)))),
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", size),
            &activity,
            |b, activity| b.iter(|| black_box(scorer.score_parallel(black_box(activity)))),
        );
    }

    group.finish();
}

/// Benchmark each factor on its own.
fn bench_single_factor(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_factor");
    let scorer = CreditScorer::default();
    let activity = generate_activity(1000);

    for kind in FactorKind::ALL.iter() {
        group.bench_with_input(BenchmarkId::new("factor", kind.id()), kind, |b, kind| {
            b.iter(|| black_box(scorer.score_factor(*kind, black_box(&activity))))
        });
    }

    group.finish();
}

/// Benchmark raw record normalization.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [10, 100, 1000].iter() {
        let values = generate_raw(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("records", size), &values, |b, values| {
            b.iter(|| black_box(normalize_values(black_box(values), Some(WALLET))))
        });
    }

    group.finish();
}

/// Benchmark report serialization and plan building.
fn bench_report_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_output");
    let report = CreditScorer::default().score(&generate_activity(500));

    group.bench_function("report_to_json", |b| {
        b.iter(|| black_box(serde_json::to_string(black_box(&report))))
    });

    group.bench_function("improvement_plan", |b| {
        b.iter(|| black_box(ImprovementPlan::from_report(black_box(&report))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_full_score,
    bench_single_factor,
    bench_normalize,
    bench_report_output,
);
criterion_main!(benches);
