//! A word-aware n-gram fingerprint index for identifying previously-seen
//! documents from short excerpts, even when the excerpt has been
//! re-flowed, re-encoded, or partially edited.
//!
//! The pipeline is: [`token`] segments text into Unicode words; those
//! words are grouped into 6-token windows; [`fingerprint`] hashes each
//! window into a 45-bit
//! fingerprint and picks a bounded, evenly spaced subset of novel ones per
//! document; [`slot`]/[`row`]/[`index`] store `(fingerprint, document_id)`
//! pairs in a fixed 2^24-bucket hash table; [`checkpoint`] debounces
//! flushing dirty rows to a [`persist::Persister`]; [`orchestrator`] wires
//! all of it behind a single reader/writer lock.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod orchestrator;
pub mod persist;
pub mod row;
pub mod slot;
pub mod token;

pub use config::IndexConfig;
pub use error::{FpError, Result};
pub use index::{HashIndex, Stats};
pub use orchestrator::{FingerprintIndexCore, IdentifyOutcome};
pub use persist::{Persister, SqlitePersister};
