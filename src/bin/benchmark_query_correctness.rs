use fpindex::{FingerprintIndexCore, IndexConfig};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::SystemTime;

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

/// Indexes a batch of synthetic documents, then queries with the exact
/// same text and checks that each document recovers its own id as the
/// top match. Not a substitute for the unit tests — this is meant to be
/// run against large document counts where the hash table's real
/// occupancy starts to matter.
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let num_documents: u32 = args[1].parse()?;
    let words_per_document: usize = args[2].parse()?;

    let config = IndexConfig {
        persist_path: std::env::temp_dir()
            .join(format!("fpindex-correctness-{}.sqlite", std::process::id())),
        ..IndexConfig::default()
    };
    let mut index = FingerprintIndexCore::open(config.clone())?;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let documents: Vec<(u32, String)> = (1..=num_documents)
        .map(|id| (id, synthetic_document(&mut rng, words_per_document)))
        .collect();

    let batch: Vec<(u32, Vec<u8>)> = documents
        .iter()
        .map(|(id, text)| (*id, text.clone().into_bytes()))
        .collect();
    index.index_batch(&batch);

    let start = SystemTime::now();
    let mut hits = 0u32;
    let mut misses = 0u32;
    for (id, text) in &documents {
        let outcome = index.identify(text.as_bytes());
        match outcome.results.first() {
            Some((top_id, _)) if top_id == id => hits += 1,
            _ => misses += 1,
        }
    }
    let query_duration = start.elapsed()?;

    index.shutdown();
    let _ = std::fs::remove_file(&config.persist_path);

    eprintln!(
        "tp;correctness: {} hits, {} misses out of {} documents",
        hits, misses, num_documents,
    );
    eprintln!(
        "tp;bench query: queried {} docs in {:?}",
        num_documents, query_duration,
    );
    Ok(())
}
