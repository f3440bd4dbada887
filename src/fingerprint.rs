use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::config::{
    FINGERPRINTS_NUM, FINGERPRINT_MASK, MAX_NGRAM_BYTES, MIN_NGRAM_BYTES, NGRAM_LEN,
};
use crate::token::Token;

/// `H64`: hashes the concatenation of `NGRAM_LEN` tokens' bytes, starting at
/// `tokens[start]`, into a 45-bit fingerprint.
///
/// SipHash-1-3 seeded with an all-zero key stands in for the xxhash64 the
/// original index was built with — spec.md §4.2 allows any stable 64-bit
/// mixing hash, provided the persisted index stays consistent about which
/// one it uses (see [`crate::config::HASH_KIND_SIPHASH13`]).
pub fn ngram_hash(text: &[u8], tokens: &[Token]) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    for token in tokens {
        hasher.write(token.slice(text));
    }
    hasher.finish() & FINGERPRINT_MASK
}

fn window_byte_len(tokens: &[Token]) -> u32 {
    tokens.iter().map(|t| t.len).sum()
}

/// Selects a bounded, evenly spaced subset of novel fingerprints from a
/// document's token stream, per spec.md §4.2.
///
/// `lookup` is the index's current `lookup(fingerprint) -> document_id`;
/// passing 0 means "not yet indexed". The two-pass structure (cheap
/// novelty-pruning pass, then a stride-sampled recompute pass) is preserved
/// verbatim from the source, including its window-count off-by-one (see
/// `DESIGN.md`): candidate windows only cover `[0, T - NGRAM_LEN)`, so a
/// document with exactly `NGRAM_LEN` tokens yields no fingerprints at all.
pub fn good_sequences(text: &[u8], tokens: &[Token], lookup: impl Fn(u64) -> u32) -> Vec<u64> {
    let total = tokens.len();
    if total < NGRAM_LEN {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for start in 0..(total - NGRAM_LEN) {
        let window = &tokens[start..start + NGRAM_LEN];
        let len = window_byte_len(window);
        if len < MIN_NGRAM_BYTES || len > MAX_NGRAM_BYTES {
            continue;
        }
        let hash = ngram_hash(text, window);
        if lookup(hash) != 0 {
            continue;
        }
        candidates.push(start);
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    let stride = (candidates.len() / FINGERPRINTS_NUM).max(1);
    let mut fingerprints = Vec::with_capacity(FINGERPRINTS_NUM);
    let mut i = 0;
    while fingerprints.len() < FINGERPRINTS_NUM && i < candidates.len() {
        let start = candidates[i];
        let window = &tokens[start..start + NGRAM_LEN];
        let hash = ngram_hash(text, window);
        if lookup(hash) == 0 {
            fingerprints.push(hash);
        }
        i += stride;
    }
    fingerprints
}

/// Forms the N-gram fingerprint for every valid window in a query's token
/// stream, with no length filter.
///
/// The source's `identify` loop bounds windows by `tokens_len` rather than
/// `tokens_len - NGRAM_LEN`, which (given its fixed-size stack array of
/// tokens) reads stale entries past the last real token for the final
/// `NGRAM_LEN - 1` starting positions — not meaningful behavior to carry
/// into safe Rust. This bounds windows to `[0, tokens_len - NGRAM_LEN]`,
/// the largest range that only ever reads real tokens.
pub fn query_fingerprints(text: &[u8], tokens: &[Token]) -> Vec<u64> {
    let total = tokens.len();
    if total < NGRAM_LEN {
        return Vec::new();
    }
    (0..=(total - NGRAM_LEN))
        .map(|start| ngram_hash(text, &tokens[start..start + NGRAM_LEN]))
        .collect()
}
