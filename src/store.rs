//! Record store: payload bytes in the buddy allocator, ids in the hash index
//!
//! Every operation writes its human-readable outcome to the supplied writer.

use std::io::{self, Write};

use bstr::BStr;
use tracing::warn;

use crate::buddy::BuddyAllocator;
use crate::error::Result;
use crate::hash_index::HashIndex;

pub struct Store {
    memory: BuddyAllocator,
    index: HashIndex,
}

impl Store {
    pub fn new(memory_size: usize, hash_size: usize) -> Result<Self> {
        Ok(Self {
            memory: BuddyAllocator::new(memory_size)?,
            index: HashIndex::new(hash_size)?,
        })
    }

    pub fn memory(&self) -> &BuddyAllocator {
        &self.memory
    }

    pub fn index(&self) -> &HashIndex {
        &self.index
    }

    /// Store `payload` under `id`; returns whether the record was added
    pub fn insert<W: Write>(&mut self, out: &mut W, id: i64, payload: &[u8]) -> io::Result<bool> {
        if id < 0 {
            writeln!(out, "Insert FAILED - Invalid record ID {}", id)?;
            return Ok(false);
        }
        if self.index.retrieve(id).is_some() {
            writeln!(out, "Insert FAILED - There is already a record with ID {}", id)?;
            return Ok(false);
        }

        let pool_before = self.memory.capacity();
        let Some(handle) = self.memory.insert(payload) else {
            writeln!(out, "Insert FAILED - Record with ID {} has no data", id)?;
            return Ok(false);
        };

        let mut pool = pool_before;
        while pool < self.memory.capacity() {
            pool *= 2;
            writeln!(out, "Memory pool expanded to {} bytes", pool)?;
        }

        let slots_before = self.index.limit();
        if !self.index.add_entry(id, handle) {
            // Keep the store unchanged when the index refuses the entry
            if let Err(e) = self.memory.remove(&handle) {
                warn!(id, error = %e, "could not release rejected payload");
            }
            writeln!(out, "Insert FAILED - There is already a record with ID {}", id)?;
            return Ok(false);
        }
        if self.index.limit() != slots_before {
            writeln!(out, "Hash table expanded to {} records", self.index.limit())?;
        }

        writeln!(out, "Successfully inserted record with ID {}", id)?;
        writeln!(out, "{}", BStr::new(payload))?;
        writeln!(out, "Size: {}", payload.len())?;
        Ok(true)
    }

    /// Print the record stored under `id`
    pub fn search<W: Write>(&self, out: &mut W, id: i64) -> io::Result<bool> {
        let Some(handle) = self.index.retrieve(id) else {
            writeln!(out, "Search FAILED -- There is no record with ID {}", id)?;
            return Ok(false);
        };

        match self.memory.get(&handle) {
            Some(payload) => {
                writeln!(out, "Found record with ID {}:", id)?;
                writeln!(out, "{}", BStr::new(payload))?;
                Ok(true)
            }
            None => {
                writeln!(out, "Search FAILED -- Record with ID {} refers to freed memory", id)?;
                Ok(false)
            }
        }
    }

    /// Remove the record stored under `id`
    pub fn delete<W: Write>(&mut self, out: &mut W, id: i64) -> io::Result<bool> {
        let Some(handle) = self.index.retrieve(id) else {
            writeln!(out, "Delete FAILED -- There is no record with ID {}", id)?;
            return Ok(false);
        };

        self.index.delete_entry(id);
        if let Err(e) = self.memory.remove(&handle) {
            warn!(id, error = %e, "index referenced a released block");
        }

        writeln!(out, "Record with ID {} successfully deleted from the database", id)?;
        Ok(true)
    }

    pub fn print_hashtable<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.index.display_hash(out)
    }

    pub fn print_free_blocks<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.memory.dump(out)
    }
}
