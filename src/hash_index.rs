//! Open-addressed index from record ids to allocator handles
//!
//! Collisions are resolved with a double-hash step. Deleted slots become
//! tombstones so later probes keep walking past them; tombstones are reused by
//! insertions and dropped when the table grows.

use std::io::{self, Write};

use tracing::{info, trace};

use crate::error::{Result, StoreError};
use crate::segment::Handle;

/// A slot's contents; `tombstoned` records are soft-deleted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub key: u64,
    pub handle: Handle,
    pub tombstoned: bool,
}

pub struct HashIndex {
    slots: Vec<Option<Record>>,
    count: usize,
}

impl HashIndex {
    /// Create a table with `capacity` slots
    ///
    /// The secondary hash divides by `capacity / 2`, so at least two slots are
    /// required.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(StoreError::InvalidTableSize(capacity));
        }
        Ok(Self {
            slots: vec![None; capacity],
            count: 0,
        })
    }

    /// Number of live records
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current number of slots
    pub fn limit(&self) -> usize {
        self.slots.len()
    }

    /// Home slot: `k mod m`
    pub fn primary_hash(&self, key: u64) -> usize {
        (key % self.slots.len() as u64) as usize
    }

    /// Probe step: `((k div m) mod (m div 2)) * 2 + 1`, always odd
    pub fn secondary_hash(&self, key: u64) -> usize {
        let m = self.slots.len() as u64;
        (((key / m) % (m / 2)) * 2 + 1) as usize
    }

    /// Store `handle` under `key`
    ///
    /// Fails for negative keys and for keys that already have a live record.
    pub fn add_entry(&mut self, key: i64, handle: Handle) -> bool {
        let Ok(key) = u64::try_from(key) else {
            return false;
        };
        if self.find(key).is_some() {
            return false;
        }

        if self.count * 2 >= self.slots.len() {
            self.grow();
        }
        self.place(Record {
            key,
            handle,
            tombstoned: false,
        });
        true
    }

    /// Handle of the live record for `key`
    pub fn retrieve(&self, key: i64) -> Option<Handle> {
        let key = u64::try_from(key).ok()?;
        self.find(key).and_then(|index| self.slots[index]).map(|record| record.handle)
    }

    /// Tombstone the live record for `key`
    pub fn delete_entry(&mut self, key: i64) -> bool {
        let Ok(key) = u64::try_from(key) else {
            return false;
        };
        let Some(index) = self.find(key) else {
            return false;
        };

        if let Some(record) = self.slots[index].as_mut() {
            record.tombstoned = true;
        }
        self.count -= 1;
        trace!(key, slot = index, "tombstoned");
        true
    }

    /// Slot currently holding the live record for `key`
    pub fn slot_of(&self, key: i64) -> Option<usize> {
        self.find(u64::try_from(key).ok()?)
    }

    /// Write the slot report
    pub fn display_hash<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Hashtable:")?;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(record) if record.tombstoned => writeln!(writer, "{}: TOMBSTONE", index)?,
                Some(record) => writeln!(writer, "{}: {}", index, record.key)?,
                None => {}
            }
        }
        writeln!(writer, "total records: {}", self.count)
    }

    /// Slots visited for `key`, starting at its home slot
    ///
    /// Bounded to one lap of the table; with a step sharing a factor with the
    /// table size the sequence revisits slots before that.
    fn probe(&self, key: u64) -> impl Iterator<Item = usize> {
        let m = self.slots.len();
        let step = self.secondary_hash(key);
        std::iter::successors(Some(self.primary_hash(key)), move |index| {
            Some((index + step) % m)
        })
        .take(m)
    }

    /// Locate the live record for `key`; stops at the first empty slot
    fn find(&self, key: u64) -> Option<usize> {
        for index in self.probe(key) {
            match self.slots[index] {
                None => return None,
                Some(record) if record.key == key && !record.tombstoned => return Some(index),
                Some(_) => {}
            }
        }
        None
    }

    /// First empty or tombstoned slot on the probe path
    fn landing(&self, key: u64) -> Option<usize> {
        self.probe(key)
            .find(|&index| self.slots[index].is_none_or(|record| record.tombstoned))
    }

    /// Write a record into its landing slot, growing if the path is saturated
    fn place(&mut self, record: Record) {
        loop {
            if let Some(index) = self.landing(record.key) {
                trace!(key = record.key, slot = index, "placed");
                self.slots[index] = Some(record);
                self.count += 1;
                return;
            }
            self.grow();
        }
    }

    /// Double the table and re-place every live record
    fn grow(&mut self) {
        let doubled = vec![None; self.slots.len() * 2];
        let previous = std::mem::replace(&mut self.slots, doubled);
        self.count = 0;

        for record in previous.into_iter().flatten() {
            if !record.tombstoned {
                self.place(record);
            }
        }

        info!(capacity = self.slots.len(), "hash table expanded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(n: usize) -> Handle {
        Handle::new(n * 8, n + 1)
    }

    fn report(index: &HashIndex) -> String {
        let mut out = Vec::new();
        index.display_hash(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_rejects_tiny_tables() {
        assert!(matches!(HashIndex::new(0), Err(StoreError::InvalidTableSize(0))));
        assert!(matches!(HashIndex::new(1), Err(StoreError::InvalidTableSize(1))));
        assert!(HashIndex::new(2).is_ok());
    }

    #[test]
    fn test_secondary_hash_values() {
        let index = HashIndex::new(10).unwrap();
        assert_eq!(index.secondary_hash(5), 1);
        assert_eq!(index.secondary_hash(10), 3);
        assert_eq!(index.secondary_hash(15), 3);
        assert_eq!(index.secondary_hash(55), 1);
    }

    #[test]
    fn test_add_and_retrieve() {
        let mut index = HashIndex::new(8).unwrap();
        assert!(index.add_entry(3, handle(3)));
        assert!(index.add_entry(11, handle(11)));
        assert_eq!(index.retrieve(3), Some(handle(3)));
        assert_eq!(index.retrieve(11), Some(handle(11)));
        assert_eq!(index.retrieve(19), None);
        assert_eq!(index.count(), 2);
    }

    #[test]
    fn test_negative_key_rejected() {
        let mut index = HashIndex::new(8).unwrap();
        assert!(!index.add_entry(-1, handle(1)));
        assert_eq!(index.retrieve(-1), None);
        assert!(!index.delete_entry(-1));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut index = HashIndex::new(8).unwrap();
        assert!(index.add_entry(4, handle(1)));
        assert!(!index.add_entry(4, handle(2)));
        assert_eq!(index.retrieve(4), Some(handle(1)));
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_collision_uses_secondary_step() {
        let mut index = HashIndex::new(4).unwrap();
        assert!(index.add_entry(1, handle(1)));
        assert!(index.add_entry(5, handle(5)));
        assert_eq!(index.slot_of(1), Some(1));
        // h2(5) = ((5 / 4) % 2) * 2 + 1 = 3, so the probe goes 1 -> 0
        assert_eq!(index.slot_of(5), Some(0));
        assert_eq!(index.retrieve(1), Some(handle(1)));
        assert_eq!(index.retrieve(5), Some(handle(5)));
    }

    #[test]
    fn test_insert_reuses_tombstone() {
        let mut index = HashIndex::new(4).unwrap();
        assert!(index.add_entry(1, handle(1)));
        assert!(index.add_entry(5, handle(5)));
        assert!(index.delete_entry(1));
        assert_eq!(index.count(), 1);

        assert!(index.add_entry(9, handle(9)));
        assert_eq!(index.slot_of(9), Some(1));
        assert_eq!(index.limit(), 4);
        assert_eq!(index.retrieve(5), Some(handle(5)));
    }

    #[test]
    fn test_lookup_walks_past_tombstones() {
        let mut index = HashIndex::new(8).unwrap();
        assert!(index.add_entry(2, handle(2)));
        assert!(index.add_entry(10, handle(10)));
        assert!(index.delete_entry(2));
        assert_eq!(index.retrieve(2), None);
        assert_eq!(index.retrieve(10), Some(handle(10)));
    }

    #[test]
    fn test_no_duplicate_behind_tombstone() {
        let mut index = HashIndex::new(8).unwrap();
        assert!(index.add_entry(2, handle(2)));
        assert!(index.add_entry(10, handle(10)));
        assert!(index.delete_entry(2));
        // 10 is still live further down the chain
        assert!(!index.add_entry(10, handle(3)));
        assert_eq!(index.retrieve(10), Some(handle(10)));
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_double_delete() {
        let mut index = HashIndex::new(8).unwrap();
        assert!(index.add_entry(7, handle(7)));
        assert!(index.delete_entry(7));
        assert!(!index.delete_entry(7));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_growth_keeps_live_records_and_drops_tombstones() {
        let mut index = HashIndex::new(4).unwrap();
        assert!(index.add_entry(1, handle(1)));
        assert!(index.add_entry(2, handle(2)));
        assert!(index.delete_entry(1));
        assert!(index.add_entry(3, handle(3)));
        assert_eq!(index.limit(), 4);

        // Two live records in four slots hits the threshold
        assert!(index.add_entry(4, handle(4)));
        assert_eq!(index.limit(), 8);
        assert_eq!(index.count(), 3);
        assert_eq!(index.retrieve(2), Some(handle(2)));
        assert_eq!(index.retrieve(3), Some(handle(3)));
        assert_eq!(index.retrieve(4), Some(handle(4)));
        assert!(!report(&index).contains("TOMBSTONE"));
    }

    #[test]
    fn test_rejected_add_at_threshold_does_not_grow() {
        let mut index = HashIndex::new(4).unwrap();
        assert!(index.add_entry(1, handle(1)));
        assert!(index.add_entry(2, handle(2)));
        assert_eq!(index.count(), 2);

        // The table is at its load limit, but neither rejection may touch it
        assert!(!index.add_entry(2, handle(3)));
        assert!(!index.add_entry(-6, handle(3)));
        assert_eq!(index.limit(), 4);
        assert_eq!(index.count(), 2);
        assert_eq!(index.retrieve(2), Some(handle(2)));

        assert!(index.add_entry(3, handle(3)));
        assert_eq!(index.limit(), 8);
    }

    #[test]
    fn test_saturated_probe_path_grows() {
        // With m = 10, key 20 starts at slot 0 and steps by 5, so it only sees slots 0 and 5
        let mut index = HashIndex::new(10).unwrap();
        assert!(index.add_entry(0, handle(0)));
        assert!(index.add_entry(5, handle(5)));
        assert_eq!(index.slot_of(0), Some(0));
        assert_eq!(index.slot_of(5), Some(5));
        assert_eq!(index.retrieve(20), None);

        assert!(index.add_entry(20, handle(20)));
        assert_eq!(index.limit(), 20);
        assert_eq!(index.count(), 3);
        assert_eq!(index.retrieve(0), Some(handle(0)));
        assert_eq!(index.retrieve(5), Some(handle(5)));
        assert_eq!(index.retrieve(20), Some(handle(20)));
    }

    #[test]
    fn test_display_hash() {
        let mut index = HashIndex::new(4).unwrap();
        assert!(index.add_entry(1, handle(1)));
        assert!(index.add_entry(5, handle(5)));
        assert!(index.delete_entry(1));
        assert_eq!(report(&index), "Hashtable:\n0: 5\n1: TOMBSTONE\ntotal records: 1\n");
    }
}
