//! Throughput benchmarks for bulk scoring.
//!
//! Run with: `cargo bench --bench throughput`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use rust_decimal::Decimal;

use credit_core::types::{NormalizedTransaction, TransactionType};
use credit_scorer::{CreditScorer, WalletActivity};

const NOW: i64 = 1_704_067_200;
const DAY: i64 = 86_400;

/// Generate a random wallet history.
fn generate_random_history(rng: &mut impl Rng, size: usize) -> Vec<NormalizedTransaction> {
    let currencies = ["SOL", "SOL", "SOL", "USDC", "USDT", "BONK", "ETH"];
    let sources = ["SYSTEM_PROGRAM", "JUPITER", "RAYDIUM", "SOLEND", "UNKNOWN"];

    (0..size)
        .map(|_| {
            let tx_type = match rng.gen_range(0..20) {
                0 => TransactionType::Borrow,
                1 => TransactionType::Repay,
                2 => TransactionType::Swap,
                3 => TransactionType::Stake,
                _ => TransactionType::Transfer,
            };
            NormalizedTransaction::new(
                NOW - rng.gen_range(0..730) * DAY - rng.gen_range(0..DAY),
                Decimal::new(rng.gen_range(-5_000..8_000), 3),
                currencies[rng.gen_range(0..currencies.len())],
            )
            .with_type(tx_type)
            .with_source(sources[rng.gen_range(0..sources.len())])
            .with_fee(Decimal::new(rng.gen_range(5..50), 6))
        })
        .collect()
}

/// Generate a batch of random wallets.
fn generate_wallet_batch(count: usize, history_size: usize) -> Vec<WalletActivity> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            WalletActivity::new(generate_random_history(&mut rng, history_size), NOW)
                .with_balance(Decimal::new(rng.gen_range(0..50_000), 3))
                .with_rate(Decimal::new(rng.gen_range(80..250), 0))
        })
        .collect()
}

/// Benchmark scoring many wallets one after another.
fn bench_wallet_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("wallet_batch");
    let scorer = CreditScorer::default();

    for wallet_count in [10, 50, 100].iter() {
        let wallets = generate_wallet_batch(*wallet_count, 200);

        group.throughput(Throughput::Elements(*wallet_count as u64));
        group.bench_with_input(
            BenchmarkId::new("score_wallets", wallet_count),
            &wallets,
            |b, wallets| {
                b.iter(|| {
                    let scores: Vec<u16> = wallets
                        .iter()
                        .map(|w| scorer.score(w).aggregate.credit_score)
                        .collect();
                    black_box(scores)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark scoring many wallets across the rayon pool.
fn bench_parallel_wallet_batch(c: &mut Criterion) {
    use rayon::prelude::*;

    let mut group = c.benchmark_group("parallel_wallet_batch");
    let scorer = CreditScorer::default();

    for wallet_count in [50, 100, 500].iter() {
        let wallets = generate_wallet_batch(*wallet_count, 200);

        group.throughput(Throughput::Elements(*wallet_count as u64));
        group.bench_with_input(
            BenchmarkId::new("parallel_wallets", wallet_count),
            &wallets,
            |b, wallets| {
                b.iter(|| {
                    let scores: Vec<u16> = wallets
                        .par_iter()
                        .map(|w| scorer.score(w).aggregate.credit_score)
                        .collect();
                    black_box(scores)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark long histories, where per-factor parallelism pays off.
fn bench_history_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_size");
    let scorer = CreditScorer::default();
    let mut rng = rand::thread_rng();

    for size in [1_000, 10_000, 50_000].iter() {
        let activity = WalletActivity::new(generate_random_history(&mut rng, *size), NOW)
            .with_balance(Decimal::from(25))
            .with_rate(Decimal::from(150));

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("sequential", size),
            &activity,
            |b, activity| b.iter(|| black_box(scorer.score(activity))),
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", size),
            &activity,
            |b, activity| b.iter(|| black_box(scorer.score_parallel(activity))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_wallet_batch,
    bench_parallel_wallet_batch,
    bench_history_size,
);
criterion_main!(benches);
