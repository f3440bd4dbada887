use thiserror::Error;

/// Errors surfaced at the crate's public boundary.
///
/// Most per-row and per-insert problems (a saturated bucket, a malformed
/// snapshot row) are not represented here: they are logged and skipped per
/// the "nothing in the core aborts" rule, rather than turned into a `Result`
/// the caller has to handle.
#[derive(Debug, Error)]
pub enum FpError {
    #[error("persister I/O failed: {0}")]
    Persist(#[from] rusqlite::Error),

    #[error("persisted index was built with hash kind {found}, expected {expected}")]
    HashKindMismatch { expected: u32, found: u32 },

    #[error("persisted metadata record is missing or malformed")]
    MissingMetadata,
}

pub type Result<T> = std::result::Result<T, FpError>;
