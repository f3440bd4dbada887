use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fpindex::HashIndex;

fn filled_index(n: u64) -> HashIndex {
    let mut index = HashIndex::new();
    for key in 0..n {
        // spread fingerprints across distinct buckets rather than piling
        // them into bucket 0, so lookup cost reflects real occupancy
        index.insert(key.wrapping_mul(0x9E37_79B9_7F4A_7C15), (key % 1_000_000) as u32 + 1);
    }
    index
}

fn insert_bench_vary_n(c: &mut Criterion) {
    let mut group = c.benchmark_group("index::insert_varying_n");
    for n in [10_000, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| filled_index(n))
        });
    }
}

fn lookup_bench_vary_n(c: &mut Criterion) {
    let mut group = c.benchmark_group("index::lookup_varying_n");
    for n in [10_000, 100_000, 1_000_000] {
        let index = filled_index(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_| {
            b.iter(|| index.lookup(black_box(12345)))
        });
    }
}

criterion_group!(benches, insert_bench_vary_n, lookup_bench_vary_n);
criterion_main!(benches);
