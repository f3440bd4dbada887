use std::fs;
use std::path::PathBuf;

use fpindex::{FingerprintIndexCore, IndexConfig};

/// Indexes every file under a directory, then identifies a query file
/// against what was just indexed. A thin driver over the library; all the
/// real work happens in `fpindex`.
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "usage: {} <corpus-dir> <query-file> [db-path]",
            args.first().map(String::as_str).unwrap_or("fpindex")
        );
        std::process::exit(1);
    }

    tracing_subscriber::fmt::init();

    let corpus_dir = PathBuf::from(&args[1]);
    let query_path = PathBuf::from(&args[2]);
    let db_path = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fpindex.sqlite"));

    let config = IndexConfig {
        persist_path: db_path,
        ..IndexConfig::default()
    };
    let mut core = FingerprintIndexCore::open(config)?;

    let mut id = 1u32;
    for entry in fs::read_dir(&corpus_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let text = fs::read(entry.path())?;
        core.index_text(id, &text);
        eprintln!("tp;indexed [{}] {}", id, entry.path().display());
        id += 1;
    }

    let query = fs::read(&query_path)?;
    let outcome = core.identify(&query);
    eprintln!(
        "tp;identify: {} candidate(s) in {}us",
        outcome.results.len(),
        outcome.elapsed_us
    );
    for (doc_id, overlap) in &outcome.results {
        println!("{}\t{}", doc_id, overlap);
    }

    core.shutdown();
    Ok(())
}
