use crate::config::ROW_SLOTS_MAX;
use crate::slot::Slot;

/// A bucket: an ordered, append-only sequence of up to 256 slots plus a
/// dirty flag. Rows are never deleted; only grown.
#[derive(Debug, Default)]
pub struct Row {
    slots: Vec<Slot>,
    dirty: bool,
}

impl Row {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn find(&self, fp_mid16: u16, fp_low5: u8) -> Option<u32> {
        self.slots
            .iter()
            .find(|slot| slot.matches(fp_mid16, fp_low5))
            .map(Slot::doc_id)
    }

    /// Appends a slot, returning `false` (and leaving the row unchanged) if
    /// the row is already at capacity.
    pub fn push(&mut self, slot: Slot) -> bool {
        if self.slots.len() >= ROW_SLOTS_MAX {
            return false;
        }
        self.slots.push(slot);
        self.dirty = true;
        true
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.slots.len() * 6);
        for slot in &self.slots {
            buf.extend_from_slice(slot.as_bytes());
        }
        buf
    }

    /// Replaces this row's slots wholesale from a persisted byte blob. Used
    /// only by the startup loader. `bytes.len()` must be a multiple of 6;
    /// the caller is expected to have already validated and logged
    /// otherwise.
    pub fn replace_from_bytes(&mut self, bytes: &[u8]) {
        self.slots = bytes
            .chunks_exact(6)
            .map(|chunk| {
                let mut arr = [0u8; 6];
                arr.copy_from_slice(chunk);
                Slot::from_bytes(arr)
            })
            .collect();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_refuses_past_capacity() {
        let mut row = Row::default();
        for i in 0..ROW_SLOTS_MAX {
            assert!(row.push(Slot::encode(i as u64, (i + 1) as u32)));
        }
        assert!(!row.push(Slot::encode(999, 1)));
        assert_eq!(row.len(), ROW_SLOTS_MAX);
    }

    #[test]
    fn bytes_round_trip() {
        let mut row = Row::default();
        row.push(Slot::encode(12345, 7));
        row.push(Slot::encode(67890, 8));
        let bytes = row.to_bytes();
        let mut reloaded = Row::default();
        reloaded.replace_from_bytes(&bytes);
        assert_eq!(reloaded.len(), 2);
        assert!(!reloaded.dirty());
    }
}
