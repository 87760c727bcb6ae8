// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Seriation Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for both seriation strategies on a shuffled
//! block-structured similarity matrix.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use insight_core::{ExternalScores, Matrix};
use insight_seriation::{Axis, DistanceMatrix, ProfileMetric, Seriator};
use insight_types::{LinkageMethod, MergeMode};

fn shuffled_blocks(n: usize, blocks: usize) -> Matrix {
    let elements: Vec<String> = (0..n).map(|i| format!("e{i:03}")).collect();
    let block_of = move |label: &str| {
        label[1..].parse::<usize>().unwrap_or(0) % blocks
    };
    let table = ExternalScores::new(elements, move |a, b| {
        Ok(if a == b {
            1.0
        } else if block_of(a) == block_of(b) {
            0.8
        } else {
            0.1
        })
    });
    let mut m = Matrix::from_scores(&table).matrix;
    m.randomize(&mut StdRng::seed_from_u64(42)).expect("square matrix");
    m
}

// ── Distance matrices ───────────────────────────────────────────────

fn bench_profile_distances(c: &mut Criterion) {
    let m = shuffled_blocks(100, 5);
    c.bench_function("profile_distances_100", |b| {
        b.iter(|| DistanceMatrix::from_profiles(black_box(&m), Axis::Rows, ProfileMetric::Manhattan))
    });
}

// ── Strategies ──────────────────────────────────────────────────────

fn bench_agglomerative(c: &mut Criterion) {
    let m = shuffled_blocks(100, 5);
    let seriator = Seriator::Agglomerative(MergeMode::Average);
    c.bench_function("agglomerative_100", |b| {
        b.iter(|| seriator.leaf_order(black_box(&m), Axis::Rows))
    });
}

fn bench_linkage(c: &mut Criterion) {
    let m = shuffled_blocks(100, 5);
    let seriator = Seriator::Linkage(LinkageMethod::Complete);
    c.bench_function("linkage_complete_100", |b| {
        b.iter(|| seriator.leaf_order(black_box(&m), Axis::Rows))
    });
}

fn bench_seriate_in_place(c: &mut Criterion) {
    let m = shuffled_blocks(60, 4);
    let seriator = Seriator::default();
    c.bench_function("seriate_60", |b| {
        b.iter(|| {
            let mut work = m.clone();
            seriator.seriate(black_box(&mut work))
        })
    });
}

criterion_group!(
    benches,
    bench_profile_distances,
    bench_agglomerative,
    bench_linkage,
    bench_seriate_in_place,
);
criterion_main!(benches);
