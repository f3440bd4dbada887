use std::time::SystemTime;

use fpindex::{FingerprintIndexCore, IndexConfig};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const VOCAB: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "tau", "upsilon",
];

fn synthetic_document(rng: &mut Xoshiro256PlusPlus, words: usize) -> String {
    (0..words)
        .map(|_| VOCAB[rng.gen_range(0..VOCAB.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let db_path = &args[1];
    let num_documents: u32 = args[2].parse()?;
    let words_per_document: usize = args[3].parse()?;

    let config = IndexConfig {
        persist_path: db_path.into(),
        ..IndexConfig::default()
    };
    let mut index = FingerprintIndexCore::open(config)?;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);
    let documents: Vec<(u32, Vec<u8>)> = (1..=num_documents)
        .map(|id| (id, synthetic_document(&mut rng, words_per_document).into_bytes()))
        .collect();

    let start = SystemTime::now();
    for chunk in documents.chunks(256) {
        index.index_batch(chunk);
    }
    let elapsed = start.elapsed()?;

    index.shutdown();

    eprintln!(
        "tp;insert: indexed {} documents in {:?} ({} docs/s)",
        num_documents,
        elapsed,
        num_documents as u128 * 1000 / elapsed.as_millis().max(1),
    );
    Ok(())
}
