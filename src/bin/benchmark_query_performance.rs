use std::time::{Duration, SystemTime};

use fpindex::{FingerprintIndexCore, IndexConfig};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use medians::Medianf64;
use rstats::{noop, Median, Stats};

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

fn run_query(index: &FingerprintIndexCore<fpindex::SqlitePersister>, text: &str) -> Duration {
    let s = SystemTime::now();
    index.identify(text.as_bytes());
    s.elapsed().unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let db_path = &args[1];
    let num_queries: u32 = args[2].parse()?;

    let config = IndexConfig {
        persist_path: db_path.into(),
        ..IndexConfig::default()
    };
    let index = FingerprintIndexCore::open(config)?;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);
    let queries: Vec<String> = (0..num_queries)
        .map(|_| synthetic_document(&mut rng, 40))
        .collect();

    let start_querying = SystemTime::now();
    let results: Vec<f64> = queries
        .par_iter()
        .map(|text| run_query(&index, text).as_micros() as f64)
        .collect();
    let query_duration = start_querying.elapsed()?;

    eprintln!(
        "tp;bench query: queried {} elems in {:?} ({:?} ops)",
        num_queries,
        query_duration,
        num_queries as u128 * 1000 / query_duration.as_millis().max(1)
    );
    eprintln!("Median     {}", results.as_slice().medstats()?);
    eprintln!("Arithmetic {}", results.ameanstd()?);
    eprintln!("{}", results.medinfo(&mut noop)?);
    Ok(())
}
