use tracing::warn;

use crate::config::{COPY_ROWS_LEN, FINGERPRINT_MASK, HASHTABLE_SIZE, ROW_SLOTS_MAX};
use crate::row::Row;
use crate::slot::{bucket_index, fp_low5, fp_mid16, Slot};

/// One dirty row's slot bytes, captured for the checkpointer to hand to the
/// persister outside the write lock.
#[derive(Debug, Clone)]
pub struct CopyRow {
    pub bucket: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Stats {
    pub used_buckets: u64,
    pub total_slots: u64,
    pub max_slots: u8,
    pub histogram: Vec<u64>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            used_buckets: 0,
            total_slots: 0,
            max_slots: 0,
            histogram: vec![0; ROW_SLOTS_MAX + 1],
        }
    }
}

/// The fixed-capacity bucketed hash table: `HASHTABLE_SIZE` rows addressed
/// by the top 24 bits of a 45-bit fingerprint.
#[derive(Debug)]
pub struct HashIndex {
    rows: Box<[Row]>,
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl HashIndex {
    pub fn new() -> Self {
        let rows: Vec<Row> = (0..HASHTABLE_SIZE).map(|_| Row::default()).collect();
        Self {
            rows: rows.into_boxed_slice(),
        }
    }

    /// Returns the document id matching `fingerprint`, or 0 if none is
    /// found in its bucket.
    pub fn lookup(&self, fingerprint: u64) -> u32 {
        let fingerprint = fingerprint & FINGERPRINT_MASK;
        let bucket = bucket_index(fingerprint);
        self.rows[bucket as usize]
            .find(fp_mid16(fingerprint), fp_low5(fingerprint))
            .unwrap_or(0)
    }

    /// Appends a new slot for `(fingerprint, document_id)`. Returns `false`
    /// if the bucket was already at capacity; the row is left unchanged in
    /// that case.
    pub fn insert(&mut self, fingerprint: u64, document_id: u32) -> bool {
        let fingerprint = fingerprint & FINGERPRINT_MASK;
        let bucket = bucket_index(fingerprint);
        let slot = Slot::encode(fingerprint, document_id);
        let row = &mut self.rows[bucket as usize];
        let inserted = row.push(slot);
        if !inserted {
            warn!(bucket, len = row.len(), "bucket saturated, insert refused");
        }
        inserted
    }

    /// Sweeps up to `COPY_ROWS_LEN` dirty rows starting at `cursor`,
    /// wrapping around the table. Clears each collected row's dirty flag.
    /// Returns the advanced cursor and whether the full table was scanned
    /// in this call.
    pub fn collect_dirty(&mut self, cursor: u32) -> (Vec<CopyRow>, u32, bool) {
        let mut out = Vec::new();
        let mut pos = cursor % HASHTABLE_SIZE as u32;
        let mut scanned = 0u32;
        while scanned < HASHTABLE_SIZE as u32 && out.len() < COPY_ROWS_LEN {
            let row = &mut self.rows[pos as usize];
            if row.dirty() {
                row.clear_dirty();
                out.push(CopyRow {
                    bucket: pos,
                    bytes: row.to_bytes(),
                });
            }
            pos = (pos + 1) % HASHTABLE_SIZE as u32;
            scanned += 1;
        }
        let exhausted = scanned == HASHTABLE_SIZE as u32;
        (out, pos, exhausted)
    }

    /// Replaces a bucket's slot sequence wholesale. Used only by the
    /// startup loader. Out-of-range buckets are ignored; malformed byte
    /// lengths are skipped, both logged.
    pub fn apply_snapshot(&mut self, bucket: u32, bytes: &[u8]) {
        if bucket as usize >= HASHTABLE_SIZE {
            warn!(bucket, "snapshot bucket index out of range, ignoring");
            return;
        }
        if bytes.len() % 6 != 0 {
            warn!(
                bucket,
                len = bytes.len(),
                "snapshot row length not a multiple of 6, skipping"
            );
            return;
        }
        self.rows[bucket as usize].replace_from_bytes(bytes);
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for row in self.rows.iter() {
            let len = row.len();
            if len > 0 {
                stats.used_buckets += 1;
            }
            stats.total_slots += len as u64;
            if len as u8 > stats.max_slots {
                stats.max_slots = len as u8;
            }
            stats.histogram[len] += 1;
        }
        stats
    }
}
