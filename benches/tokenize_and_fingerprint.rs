use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fpindex::fingerprint::good_sequences;
use fpindex::token::tokenize;

fn synthetic_text(words: usize) -> String {
    const VOCAB: &[&str] = &[
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    ];
    (0..words)
        .map(|i| VOCAB[i % VOCAB.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokenize_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize::varying_length");
    for words in [50, 500, 2_000] {
        let text = synthetic_text(words);
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| tokenize(black_box(text), 8_192))
        });
    }
}

fn good_sequences_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("good_sequences::varying_length");
    for words in [50, 500, 2_000] {
        let text = synthetic_text(words);
        let tokens = tokenize(&text, 8_192);
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| good_sequences(black_box(text.as_bytes()), black_box(&tokens), |_| 0))
        });
    }
}

criterion_group!(benches, tokenize_bench, good_sequences_bench);
criterion_main!(benches);
