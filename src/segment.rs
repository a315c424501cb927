//! Value types describing byte ranges inside the arena

/// A contiguous, power-of-two sized range of the arena
///
/// Splitting and merging produce new values; a segment is never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    offset: usize,
    size: usize,
}

impl Segment {
    pub fn new(offset: usize, size: usize) -> Self {
        debug_assert!(size.is_power_of_two(), "segment size {} is not a power of two", size);
        Self { offset, size }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Size class index: the `i` with `size == 2^i`
    pub fn class(&self) -> usize {
        self.size.trailing_zeros() as usize
    }

    /// Offset of the segment that, together with this one, rebuilds the parent block
    pub fn buddy_offset(&self) -> usize {
        self.offset ^ self.size
    }

    /// Whether any byte of `offset..offset + len` falls inside this segment
    pub fn overlaps(&self, offset: usize, len: usize) -> bool {
        offset < self.offset + self.size && self.offset < offset.saturating_add(len)
    }

    /// Split into low and high halves
    pub fn split(&self) -> (Segment, Segment) {
        let half = self.size / 2;
        (
            Segment::new(self.offset, half),
            Segment::new(self.offset + half, half),
        )
    }

    /// Merge with a buddy of the same size into the parent block
    pub fn merge(&self, buddy: &Segment) -> Segment {
        debug_assert_eq!(self.size, buddy.size);
        Segment::new(self.offset.min(buddy.offset), self.size * 2)
    }
}

/// Location and exact length of a stored payload
///
/// Only [`BuddyAllocator::insert`](crate::buddy::BuddyAllocator::insert) hands
/// these out. A handle must not be used after it has been removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    offset: usize,
    length: usize,
}

impl Handle {
    pub(crate) fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the stored payload, not of its backing block
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Size of the block backing this payload
    pub fn block_size(&self) -> usize {
        self.length.next_power_of_two()
    }
}

/// Smallest `c` with `2^c >= len`
pub fn size_class(len: usize) -> usize {
    len.max(1).next_power_of_two().trailing_zeros() as usize
}
