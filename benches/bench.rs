//! Criterion benchmarks for lexbloom.
//!
//! Covers sizing, probe hashing, corpus ingestion with both duplicate
//! detection strategies, and full per-corpus runs.

use std::hint::black_box;
use std::io::Cursor;
use std::num::NonZeroUsize;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lexbloom::bloom::{
    BloomFilter, HashScheme, estimate_bit_array_size, refine_bit_array_size,
};
use lexbloom::corpus::{CorpusLoader, DedupStrategy, LoaderConfig, MemoryCorpusProvider};
use lexbloom::parallel_build::{ExecutionMode, ParallelBuildConfig, ParallelBuildEngine};
use lexbloom::report::NullSink;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a corpus of `count` words drawn from a vocabulary of `vocabulary` words.
fn generate_corpus(count: usize, vocabulary: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = String::with_capacity(count * 8);
    for i in 0..count {
        let word = rng.random_range(0..vocabulary);
        text.push_str(&format!("w{word:x}"));
        text.push(if i % 12 == 11 { '\n' } else { ' ' });
    }
    text
}

/// Benchmark bit array sizing.
fn bench_sizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sizing");

    group.bench_function("closed_form", |b| {
        b.iter(|| estimate_bit_array_size(black_box(100_000), black_box(0.05)))
    });

    group.sample_size(10);
    group.bench_function("iterative_refinement", |b| {
        b.iter(|| refine_bit_array_size(black_box(1_000), black_box(0.05), black_box(4)))
    });

    group.finish();
}

/// Benchmark probe index derivation.
fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");
    let m = NonZeroUsize::new(623_523).unwrap();

    for scheme in [HashScheme::DivisionMethod, HashScheme::DoubleHashing] {
        group.bench_function(scheme.name(), |b| {
            b.iter(|| scheme.indices(black_box("geohash"), m, 4).sum::<usize>())
        });
    }

    group.finish();
}

/// Benchmark corpus ingestion.
fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("loading");
    let corpus = generate_corpus(20_000, 2_000, 7);
    group.throughput(Throughput::Bytes(corpus.len() as u64));

    for dedup in [DedupStrategy::Hashed, DedupStrategy::LinearScan] {
        let loader = CorpusLoader::new(LoaderConfig {
            dedup,
            ..Default::default()
        });
        let name = match dedup {
            DedupStrategy::Hashed => "hashed",
            DedupStrategy::LinearScan => "linear_scan",
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let loaded = loader
                    .load(Box::new(Cursor::new(corpus.as_bytes())))
                    .unwrap();
                black_box(loaded.unique_count())
            })
        });
    }

    group.finish();
}

/// Benchmark filter construction from unique tokens.
fn bench_filter_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_build");
    let tokens: Vec<String> = (0..10_000).map(|i| format!("token{i}")).collect();
    let m = estimate_bit_array_size(tokens.len(), 0.05);
    group.throughput(Throughput::Elements(tokens.len() as u64));

    for scheme in [HashScheme::DivisionMethod, HashScheme::DoubleHashing] {
        group.bench_function(scheme.name(), |b| {
            b.iter(|| {
                let filter = BloomFilter::build(&tokens, m, 4, scheme).unwrap();
                black_box(filter.count_ones())
            })
        });
    }

    group.finish();
}

/// Benchmark whole runs over several corpora.
fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(20);

    let names = ["one", "two", "three", "four"];
    let mut provider = MemoryCorpusProvider::new();
    for (seed, name) in names.iter().enumerate() {
        provider.insert(*name, generate_corpus(20_000, 5_000, seed as u64));
    }
    let provider = Arc::new(provider);

    for mode in [ExecutionMode::Parallel, ExecutionMode::Sequential] {
        let engine = ParallelBuildEngine::new(
            ParallelBuildConfig::default().with_execution_mode(mode),
            provider.clone(),
        )
        .unwrap();
        let name = match mode {
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Sequential => "sequential",
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let summary = engine.run_all(&names, &mut NullSink).unwrap();
                black_box(summary.aggregate.total_unique_words)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sizing,
    bench_hashing,
    bench_loading,
    bench_filter_build,
    bench_engine
);

criterion_main!(benches);
