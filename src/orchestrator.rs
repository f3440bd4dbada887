use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::info;

use crate::checkpoint::Checkpointer;
use crate::config::{
    IndexConfig, HASH_KIND_SIPHASH13, MAX_ID, MAX_LOOKUP_TEXT_LEN, MAX_TEXT_LEN, NGRAM_LEN,
};
use crate::error::{FpError, Result};
use crate::fingerprint::{good_sequences, query_fingerprints};
use crate::index::{HashIndex, Stats};
use crate::persist::{Persister, SqlitePersister};
use crate::token::{tokenize, Token};

/// `identify`'s result: how long the lookup phase took, and the matching
/// documents sorted by overlap count descending.
#[derive(Debug, Clone)]
pub struct IdentifyOutcome {
    pub elapsed_us: u64,
    pub results: Vec<(u32, u8)>,
}

/// Binds the hash index, its persister, and the checkpointer thread behind
/// a single reader/writer lock, exposing the programmatic surface spec.md
/// §6 calls for.
#[derive(Debug)]
pub struct FingerprintIndexCore<P: Persister> {
    index: Arc<RwLock<HashIndex>>,
    persister: Arc<Mutex<P>>,
    last_update: Arc<Mutex<Option<Instant>>>,
    checkpointer: Option<Checkpointer>,
}

impl FingerprintIndexCore<SqlitePersister> {
    /// Opens (or creates) the SQLite-backed persister at `config.persist_path`,
    /// replays its rows into a fresh index, and starts the checkpointer.
    pub fn open(config: IndexConfig) -> Result<Self> {
        let mut persister = SqlitePersister::open(&config.persist_path)?;

        let rows = persister.iterate()?;
        match persister.read_metadata()? {
            Some(found) if found != HASH_KIND_SIPHASH13 => {
                return Err(FpError::HashKindMismatch {
                    expected: HASH_KIND_SIPHASH13,
                    found,
                })
            }
            Some(_) => {}
            // A fresh database has no rows and no metadata yet; tag it. A
            // database with rows but no metadata predates hash_kind
            // tracking and can't be trusted to hold SipHash13 fingerprints.
            None if rows.is_empty() => persister.put_metadata(HASH_KIND_SIPHASH13)?,
            None => return Err(FpError::MissingMetadata),
        }

        let mut index = HashIndex::new();
        let mut loaded_rows = 0u64;
        for (bucket, bytes) in rows {
            index.apply_snapshot(bucket, &bytes);
            loaded_rows += 1;
        }

        let stats = index.stats();
        info!(
            loaded_rows,
            used_buckets = stats.used_buckets,
            total_slots = stats.total_slots,
            max_slots = stats.max_slots,
            "startup load complete"
        );

        Ok(Self::with_index_and_persister(index, persister, config))
    }
}

impl<P> FingerprintIndexCore<P>
where
    P: Persister + Send + 'static,
{
    pub fn with_index_and_persister(index: HashIndex, persister: P, config: IndexConfig) -> Self {
        let index = Arc::new(RwLock::new(index));
        let persister = Arc::new(Mutex::new(persister));
        let last_update = Arc::new(Mutex::new(None));

        let checkpointer = Checkpointer::spawn(
            index.clone(),
            persister.clone(),
            last_update.clone(),
            config,
        );

        Self {
            index,
            persister,
            last_update,
            checkpointer: Some(checkpointer),
        }
    }

    /// Indexes a batch of `(id, text)` documents atomically under the
    /// write lock. Per-document rejects (id 0, id > MAX_ID, too few
    /// tokens, no good sequences) are silent no-ops for that document;
    /// they never fail the whole batch.
    ///
    /// Tokenization (Unicode word segmentation over each document, which
    /// doesn't touch the index) runs in parallel via `rayon`. Good-sequence
    /// selection and insertion run sequentially under one write-lock
    /// acquisition for the whole batch, so a later document's novelty
    /// check observes an earlier document's insertions from the same
    /// batch — first-writer-wins (spec.md §9, §8 scenario 6) holds within
    /// a batch, not just across separate calls.
    pub fn index_batch(&self, items: &[(u32, Vec<u8>)]) {
        let prepared: Vec<(u32, String, Vec<Token>)> = items
            .par_iter()
            .filter_map(|(id, text)| {
                if *id == 0 || *id > MAX_ID {
                    return None;
                }
                let text = String::from_utf8_lossy(text).into_owned();
                let tokens = tokenize(&text, MAX_TEXT_LEN);
                if tokens.len() < NGRAM_LEN {
                    return None;
                }
                Some((*id, text, tokens))
            })
            .collect();

        if prepared.is_empty() {
            return;
        }

        let mut any_inserted = false;
        {
            let mut guard = self.index.write();
            for (id, text, tokens) in &prepared {
                let bytes = text.as_bytes();
                let fingerprints = good_sequences(bytes, tokens, |fp| guard.lookup(fp));
                if fingerprints.len() < 2 {
                    continue;
                }
                for fp in &fingerprints {
                    guard.insert(*fp, *id);
                }
                any_inserted = true;
            }
        }

        if any_inserted {
            *self.last_update.lock() = Some(Instant::now());
        }
    }

    pub fn index_text(&self, id: u32, text: &[u8]) {
        self.index_batch(std::slice::from_ref(&(id, text.to_vec())));
    }

    /// Looks up every n-gram window of `text` (no length filter), tallying
    /// how many distinct n-grams match each document, deduplicated within
    /// the query so a repeated n-gram counts once per document.
    pub fn identify(&self, text: &[u8]) -> IdentifyOutcome {
        let start = Instant::now();

        let text = String::from_utf8_lossy(text).into_owned();
        let tokens = tokenize(&text, MAX_LOOKUP_TEXT_LEN);
        let fingerprints = query_fingerprints(text.as_bytes(), &tokens);

        let mut seen = HashSet::with_capacity(fingerprints.len());
        let mut tally: Vec<(u32, u8)> = Vec::new();
        {
            let guard = self.index.read();
            for fp in fingerprints {
                if !seen.insert(fp) {
                    continue;
                }
                let id = guard.lookup(fp);
                if id == 0 {
                    continue;
                }
                match tally.iter_mut().find(|(existing, _)| *existing == id) {
                    Some(entry) => entry.1 = entry.1.saturating_add(1),
                    None => tally.push((id, 1)),
                }
            }
        }

        tally.sort_by(|a, b| b.1.cmp(&a.1));
        IdentifyOutcome {
            elapsed_us: start.elapsed().as_micros() as u64,
            results: tally,
        }
    }

    pub fn stats(&self) -> Stats {
        self.index.read().stats()
    }

    /// Stops the checkpointer, flushing any remaining dirty rows first.
    pub fn shutdown(&mut self) {
        if let Some(checkpointer) = self.checkpointer.take() {
            checkpointer.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::SqlitePersister;
    use std::time::Duration;

    fn test_config() -> IndexConfig {
        IndexConfig {
            checkpoint_poll_interval: Duration::from_millis(5),
            checkpoint_debounce: Duration::from_millis(50),
            persist_path: std::path::PathBuf::new(),
        }
    }

    fn new_core() -> FingerprintIndexCore<SqlitePersister> {
        let persister = SqlitePersister::open_in_memory().unwrap();
        FingerprintIndexCore::with_index_and_persister(HashIndex::new(), persister, test_config())
    }

    #[test]
    fn indexing_then_identifying_the_same_text_finds_it() {
        let core = new_core();
        let text = b"The quick brown fox jumps over the lazy dog repeatedly today";
        core.index_text(42, text);
        let outcome = core.identify(text);
        assert_eq!(outcome.results.first().map(|(id, _)| *id), Some(42));
        assert!(outcome.results[0].1 >= 2);
    }

    #[test]
    fn zero_id_is_a_no_op() {
        let core = new_core();
        core.index_text(0, b"alpha beta gamma delta epsilon zeta eta theta");
        assert_eq!(core.stats().total_slots, 0);
    }

    #[test]
    fn short_text_is_a_no_op() {
        let core = new_core();
        core.index_text(1, b"alpha beta gamma");
        assert_eq!(core.stats().total_slots, 0);
    }

    #[test]
    fn empty_query_returns_no_results() {
        let core = new_core();
        let outcome = core.identify(b"");
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn identify_is_idempotent() {
        let core = new_core();
        let text = b"alpha beta gamma delta epsilon zeta eta theta iota kappa";
        core.index_text(5, text);
        let first = core.identify(text);
        let second = core.identify(text);
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn repeated_ngram_counts_once_per_query() {
        let core = new_core();
        let doc = b"alpha beta gamma delta epsilon zeta eta theta";
        core.index_text(9, doc);
        // repeat the same six-word window three times in the query text
        let query = "alpha beta gamma delta epsilon zeta ".repeat(3);
        let outcome = core.identify(query.as_bytes());
        if let Some((_, count)) = outcome.results.iter().find(|(id, _)| *id == 9) {
            assert_eq!(*count, 1);
        }
    }

    #[test]
    fn second_writer_gets_no_fingerprints_on_full_overlap() {
        let core = new_core();
        let text = b"alpha beta gamma delta epsilon zeta eta theta iota kappa";
        core.index_text(42, text);
        core.index_text(43, text);
        let outcome = core.identify(text);
        assert!(outcome.results.iter().all(|(id, _)| *id != 43));
        assert!(outcome.results.iter().any(|(id, _)| *id == 42));
    }

    fn file_config() -> (tempfile::TempDir, IndexConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig {
            persist_path: dir.path().join("index.sqlite"),
            ..test_config()
        };
        (dir, config)
    }

    #[test]
    fn open_on_a_fresh_file_tags_it_and_starts_empty() {
        let (_dir, config) = file_config();
        let mut core = FingerprintIndexCore::open(config).unwrap();
        pretty_assertions::assert_eq!(core.stats().total_slots, 0);
        core.shutdown();
    }

    #[test]
    fn open_twice_round_trips_indexed_documents() {
        let (_dir, config) = file_config();
        let text = b"alpha beta gamma delta epsilon zeta eta theta iota kappa";

        let mut first = FingerprintIndexCore::open(config.clone()).unwrap();
        first.index_text(7, text);
        // force a flush synchronously instead of waiting on the
        // checkpointer's debounce, through the same connection the
        // checkpointer shares, so the reopen below sees the rows.
        {
            let (rows, _, _) = first.index.write().collect_dirty(0);
            let mut p = first.persister.lock();
            p.begin_txn().unwrap();
            for row in &rows {
                p.put(row.bucket, &row.bytes).unwrap();
            }
            p.commit_txn().unwrap();
        }
        first.shutdown();

        let second = FingerprintIndexCore::open(config).unwrap();
        let outcome = second.identify(text);
        pretty_assertions::assert_eq!(outcome.results.first().map(|(id, _)| *id), Some(7));
    }

    #[test]
    fn open_rejects_a_database_tagged_with_a_different_hash_kind() {
        let (_dir, config) = file_config();
        {
            let mut p = SqlitePersister::open(&config.persist_path).unwrap();
            p.put_metadata(999).unwrap();
        }
        let err = FingerprintIndexCore::open(config).unwrap_err();
        match err {
            FpError::HashKindMismatch { expected, found } => {
                pretty_assertions::assert_eq!(expected, HASH_KIND_SIPHASH13);
                pretty_assertions::assert_eq!(found, 999);
            }
            other => panic!("expected HashKindMismatch, got {other:?}"),
        }
    }

    #[test]
    fn open_rejects_rows_with_no_metadata_tag() {
        let (_dir, config) = file_config();
        {
            let mut p = SqlitePersister::open(&config.persist_path).unwrap();
            p.put(3, &[0; 6]).unwrap();
        }
        let err = FingerprintIndexCore::open(config).unwrap_err();
        assert!(matches!(err, FpError::MissingMetadata));
    }
}
