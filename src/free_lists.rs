//! Free segments grouped by power-of-two size class

use tracing::{debug, trace};

use crate::list::LinkedList;
use crate::segment::Segment;

/// Free segments of a single size class
pub type SegmentList = LinkedList<Segment>;

impl LinkedList<Segment> {
    /// Reorder ascending by segment offset
    pub fn sort_by_offset(&mut self) {
        self.sort_by_key(Segment::offset);
    }
}

/// One [`SegmentList`] per size class; class `i` holds segments of size `2^i`
pub struct FreeLists {
    classes: Vec<SegmentList>,
}

impl FreeLists {
    /// Create `class_count` empty classes
    pub fn new(class_count: usize) -> Self {
        Self {
            classes: (0..class_count).map(|_| SegmentList::new()).collect(),
        }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Add one empty class on top
    pub fn add_class(&mut self) {
        self.classes.push(SegmentList::new());
    }

    /// Append a free segment to its size class
    pub fn push(&mut self, segment: Segment) {
        debug_assert!(segment.class() < self.classes.len());
        self.classes[segment.class()].append(segment);
    }

    /// Take the first segment of `class`
    pub fn pop_front(&mut self, class: usize) -> Option<Segment> {
        self.classes.get_mut(class)?.remove_first()
    }

    /// Lowest non-empty class at or above `class`
    pub fn first_available(&self, class: usize) -> Option<usize> {
        (class..self.classes.len()).find(|&c| !self.classes[c].is_empty())
    }

    /// A free segment sharing at least one byte with `offset..offset + len`
    pub fn overlapping(&self, offset: usize, len: usize) -> Option<Segment> {
        self.segments()
            .find(|segment| segment.overlaps(offset, len))
            .copied()
    }

    /// Sum of the sizes of every free segment
    pub fn total_free(&self) -> usize {
        self.segments().map(|segment| segment.size()).sum()
    }

    pub fn sort_all(&mut self) {
        for list in &mut self.classes {
            list.sort_by_offset();
        }
    }

    /// Non-empty classes, ascending, with their block size and segments
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &SegmentList)> {
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .map(|(class, list)| (1usize << class, list))
    }

    /// Every free segment, smallest class first
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.classes.iter().flat_map(|list| list.iter())
    }

    /// Merge free buddies until no pair remains
    ///
    /// Scans classes from largest to smallest; whenever a segment's buddy is
    /// also free, both are replaced by their parent one class up and the scan
    /// of the current class restarts. Passes repeat until one performs no
    /// merge. Returns the number of merges.
    pub fn consolidate(&mut self) -> usize {
        let mut merges = 0;

        loop {
            let before = merges;

            for class in (0..self.classes.len()).rev() {
                // The top class covers the whole arena and has no parent
                if class + 1 >= self.classes.len() {
                    continue;
                }

                let mut index = 0;
                while let Some(segment) = self.classes[class].get(index).copied() {
                    let buddy = Segment::new(segment.buddy_offset(), segment.size());
                    if !self.classes[class].includes(&buddy) {
                        index += 1;
                        continue;
                    }

                    self.classes[class].remove(&segment);
                    self.classes[class].remove(&buddy);
                    let parent = segment.merge(&buddy);
                    trace!(
                        offset = parent.offset(),
                        size = parent.size(),
                        "merged buddies"
                    );
                    self.classes[class + 1].append(parent);
                    merges += 1;
                    index = 0;
                }
            }

            if merges == before {
                break;
            }
        }

        if merges > 0 {
            debug!(merges, "consolidated free blocks");
        }
        merges
    }
}
