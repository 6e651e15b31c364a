//! # Ledger-Chain Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | lc-03 Block Storage | append (inline, off-chain) |
//! | lc-03 Block Storage | lookup by number and by hash |
//! | lc-04 Chain Validation | full-chain validation |
//! | lc-02 Off-Chain Storage | store and retrieve, sealed and plain |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lc_tests::integration::fixtures::{append, in_memory_ledger, TestLedger};
use std::time::Duration;

fn ledger_with_blocks(count: u64) -> TestLedger {
    let t = in_memory_ledger();
    for i in 0..count {
        append(&t.ledger, &t.alice, format!("benchmark entry {i}").as_bytes());
    }
    t
}

// ============================================================================
// LC-03: Block Storage
// ============================================================================

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-03-append");
    group.measurement_time(Duration::from_secs(10));

    for size in [64usize, 4 * 1024] {
        let t = in_memory_ledger();
        let payload = vec![0xabu8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("add_block", size), &payload, |b, payload| {
            b.iter(|| black_box(append(&t.ledger, &t.alice, payload)))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-03-lookup");
    let t = ledger_with_blocks(1_000);
    let middle = t.ledger.get_block(500).unwrap();

    group.bench_function("get_block", |b| {
        b.iter(|| black_box(t.ledger.get_block(black_box(500)).unwrap()))
    });
    group.bench_function("get_block_by_hash", |b| {
        b.iter(|| black_box(t.ledger.get_block_by_hash(&middle.hash).unwrap()))
    });

    group.finish();
}

// ============================================================================
// LC-04: Chain Validation
// ============================================================================

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-04-validation");
    group.measurement_time(Duration::from_secs(10));

    for length in [10u64, 100, 1_000] {
        let t = ledger_with_blocks(length);
        group.throughput(Throughput::Elements(length));
        group.bench_with_input(BenchmarkId::new("validate_chain", length), &t, |b, t| {
            b.iter(|| black_box(t.ledger.validate_chain_detailed().unwrap()))
        });
    }

    group.finish();
}

// ============================================================================
// LC-02: Off-Chain Storage
// ============================================================================

fn bench_off_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("lc-02-off-chain");
    let t = in_memory_ledger();
    let payload = vec![7u8; 64 * 1024];
    let recipient = t.bob.public_key().encode();

    let plain = t.ledger.store_off_chain(&payload, None).unwrap();
    let sealed = t.ledger.store_off_chain(&payload, Some(&recipient)).unwrap();

    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("retrieve_plain", |b| {
        b.iter(|| black_box(t.ledger.retrieve_off_chain(&plain, None).unwrap()))
    });
    group.bench_function("retrieve_sealed", |b| {
        b.iter(|| black_box(t.ledger.retrieve_off_chain(&sealed, Some(&t.bob)).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_lookup,
    bench_validation,
    bench_off_chain
);
criterion_main!(benches);
