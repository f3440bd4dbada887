use std::time::Duration;

/// Compatibility-bearing constants from the wire/persistence format.
///
/// These are not configurable: changing them changes the meaning of an
/// already-persisted index, so they live as associated constants rather
/// than [`IndexConfig`] fields.
pub const HASHTABLE_SIZE: usize = 1 << 24;
pub const ROW_SLOTS_MAX: usize = 256;
pub const NGRAM_LEN: usize = 6;
pub const FINGERPRINTS_NUM: usize = 10;
pub const MAX_TEXT_LEN: usize = 8_192;
pub const MAX_LOOKUP_TEXT_LEN: usize = 10_204;
pub const MAX_ID: u32 = 134_217_727;
pub const MIN_NGRAM_BYTES: u32 = 10;
pub const MAX_NGRAM_BYTES: u32 = 120;
pub const FINGERPRINT_MASK: u64 = 0x1FFF_FFFF_FFFF;
pub const MAX_NGRAMS: usize = MAX_LOOKUP_TEXT_LEN / NGRAM_LEN + 1;
pub const COPY_ROWS_LEN: usize = 100_000;

/// Identifies which 64-bit mixing hash produced a persisted index's
/// fingerprints. Bumping this is a breaking change to the persisted format.
pub const HASH_KIND_SIPHASH13: u32 = 1;

/// Tunables that don't affect on-disk compatibility: checkpoint cadence,
/// where the persister keeps its file, and so on.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// How often the checkpointer wakes up to check for quiescence.
    pub checkpoint_poll_interval: Duration,
    /// How long the index must go without an `index_batch` call before the
    /// checkpointer considers it quiescent and flushes dirty rows.
    pub checkpoint_debounce: Duration,
    /// Filesystem path of the SQLite-backed persister.
    pub persist_path: std::path::PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            checkpoint_poll_interval: Duration::from_millis(10),
            checkpoint_debounce: Duration::from_secs(2),
            persist_path: std::path::PathBuf::from("fpindex.sqlite"),
        }
    }
}
