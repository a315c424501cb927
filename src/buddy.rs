//! Buddy-system allocator over a growable byte arena
//!
//! Payloads are placed in the smallest free power-of-two block that fits.
//! Larger blocks are split in half on the way down and free buddies are merged
//! back together after every release and every growth.

use std::io::{self, Write};

use tracing::{info, trace};

use crate::arena::Arena;
use crate::error::{Result, StoreError};
use crate::free_lists::FreeLists;
use crate::segment::{size_class, Handle, Segment};

pub struct BuddyAllocator {
    arena: Arena,
    free: FreeLists,
}

impl BuddyAllocator {
    /// Create an allocator whose whole pool starts as one free block
    ///
    /// `size` must be a positive power of two.
    pub fn new(size: usize) -> Result<Self> {
        if !size.is_power_of_two() {
            return Err(StoreError::InvalidPoolSize(size));
        }

        let mut free = FreeLists::new(size_class(size) + 1);
        free.push(Segment::new(0, size));

        Ok(Self {
            arena: Arena::new(size),
            free,
        })
    }

    /// Current pool size in bytes
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Number of size classes currently tracked
    pub fn class_count(&self) -> usize {
        self.free.class_count()
    }

    /// Store `data`, growing the pool as often as needed
    ///
    /// Returns `None` for an empty payload.
    pub fn insert(&mut self, data: &[u8]) -> Option<Handle> {
        if data.is_empty() {
            return None;
        }

        let len = data.len();
        let wanted = size_class(len);

        let mut class = loop {
            match self.free.first_available(wanted) {
                Some(class) if self.free.total_free() >= len => break class,
                _ => self.grow(),
            }
        };

        let mut block = self.free.pop_front(class)?;
        while class > wanted {
            class -= 1;
            let (low, high) = block.split();
            self.free.push(high);
            block = low;
        }

        if !self.arena.write_at(block.offset(), data) {
            self.free.push(block);
            return None;
        }
        self.free.sort_all();

        trace!(offset = block.offset(), len, block = block.size(), "inserted");
        Some(Handle::new(block.offset(), len))
    }

    /// Bytes stored under `handle`
    ///
    /// Returns `None` if the handle's block overlaps free space (it was removed)
    /// or lies outside the pool.
    pub fn get(&self, handle: &Handle) -> Option<&[u8]> {
        if self.is_stale(handle) {
            return None;
        }
        self.arena.read_at(handle.offset(), handle.len())
    }

    /// Return the block backing `handle` to the free lists
    ///
    /// The block size is recovered by rounding the payload length up to a
    /// power of two, so the handle must be exactly as `insert` issued it.
    pub fn remove(&mut self, handle: &Handle) -> Result<()> {
        if self.is_stale(handle) {
            return Err(StoreError::StaleHandle {
                offset: handle.offset(),
                length: handle.len(),
            });
        }

        self.free
            .push(Segment::new(handle.offset(), handle.block_size()));
        self.free.sort_all();
        self.free.consolidate();
        self.free.sort_all();

        trace!(offset = handle.offset(), len = handle.len(), "removed");
        Ok(())
    }

    /// Sum of the sizes of all free blocks
    pub fn total_free_space(&self) -> usize {
        self.free.total_free()
    }

    /// Merge any remaining free buddies; returns the number of merges
    pub fn consolidate(&mut self) -> usize {
        let merges = self.free.consolidate();
        self.free.sort_all();
        merges
    }

    /// Write the free-block report
    pub fn dump<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Freeblock List:")?;

        let mut any = false;
        for (size, list) in self.free.occupied() {
            any = true;
            let offsets: Vec<String> = list.iter().map(|s| s.offset().to_string()).collect();
            writeln!(writer, "{}: {}", size, offsets.join(" "))?;
        }

        if !any {
            writeln!(writer, "There are no freeblocks in the memory pool")?;
        }
        Ok(())
    }

    /// Double the pool and free its new upper half
    fn grow(&mut self) {
        let upper = self.arena.grow();
        self.free.add_class();
        self.free.push(Segment::new(upper, upper));
        self.free.consolidate();
        self.free.sort_all();

        info!(capacity = self.arena.capacity(), "memory pool expanded");
    }

    fn is_stale(&self, handle: &Handle) -> bool {
        let block = handle.block_size();
        handle.is_empty()
            || handle.offset() % block != 0
            || handle
                .offset()
                .checked_add(block)
                .is_none_or(|end| end > self.capacity())
            || self.free.overlapping(handle.offset(), block).is_some()
    }
}
