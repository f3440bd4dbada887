use std::path::PathBuf;
use std::str::FromStr;

use fpindex::{FingerprintIndexCore, IndexConfig};

/// Loads a persisted index and reports how slots are spread across
/// buckets — useful for spotting a skewed mixing hash before it shows up
/// as a surprising false-positive rate at query time.
fn bucket_distribution(db_path: &PathBuf) -> anyhow::Result<()> {
    let config = IndexConfig {
        persist_path: db_path.clone(),
        ..IndexConfig::default()
    };
    let core = FingerprintIndexCore::open(config)?;
    let stats = core.stats();

    eprintln!(
        "tp;buckets: {} used / {} total, {} slots, max {} per bucket",
        stats.used_buckets,
        fpindex::config::HASHTABLE_SIZE,
        stats.total_slots,
        stats.max_slots,
    );
    eprintln!(
        "tp;occupancy histogram (slots-per-bucket -> bucket count), first 16: {:?}",
        &stats.histogram[..16.min(stats.histogram.len())],
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let db_path = PathBuf::from_str(&args[1])?;
    bucket_distribution(&db_path)
}
