//! Contiguous byte store backing the allocator
//!
//! The arena only knows about bytes and bounds; which ranges are in use is
//! tracked by the allocator's free lists.

/// Owns the raw bytes of the memory pool
pub struct Arena {
    bytes: Vec<u8>,
}

impl Arena {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Total bytes in the pool
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Copy `data` into the pool at `offset`
    ///
    /// Returns false without writing anything if the range does not fit.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> bool {
        match self.range_mut(offset, data.len()) {
            Some(dest) => {
                dest.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    /// View `len` bytes starting at `offset`, if in bounds
    pub fn read_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }

    /// Double the pool, keeping existing bytes in the low half
    ///
    /// Returns the offset where the new upper half begins.
    pub fn grow(&mut self) -> usize {
        let old = self.bytes.len();
        let mut expanded = vec![0; old * 2];
        expanded[..old].copy_from_slice(&self.bytes);
        self.bytes = expanded;
        old
    }

    fn range_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get_mut(offset..end)
    }
}
