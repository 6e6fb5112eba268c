//! Splittable ranges.
//!
//! A range knows its length, whether it is still worth splitting (longer than
//! its grain) and how to split itself into two non-overlapping halves whose
//! union is the original range.

use std::ops::Range;

pub trait SplitRange: Sized + Send {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` while the range holds more elements than its grain.
    fn is_divisible(&self) -> bool;

    /// Splits into a left and a right half, left first in range order.
    fn split(self) -> (Self, Self);
}

/// Read-only view into a buffer, remembering where it sits in the original.
#[derive(Debug)]
pub struct BlockedRange<'a, T> {
    data: &'a [T],
    offset: usize,
    grain: usize,
}

impl<'a, T> Clone for BlockedRange<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for BlockedRange<'a, T> {}

impl<'a, T> BlockedRange<'a, T> {
    /// A range over all of `data`. A grain of zero is treated as one.
    pub fn new(data: &'a [T], grain: usize) -> Self {
        Self {
            data,
            offset: 0,
            grain: grain.max(1),
        }
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Index of the first element within the buffer the range was created on.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn grain(&self) -> usize {
        self.grain
    }

    /// Splits before local index `mid`.
    ///
    /// # Panics
    ///
    /// Panics if `mid > self.len()`.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        let (left, right) = self.data.split_at(mid);
        (
            Self {
                data: left,
                offset: self.offset,
                grain: self.grain,
            },
            Self {
                data: right,
                offset: self.offset + mid,
                grain: self.grain,
            },
        )
    }
}

impl<'a, T: Sync> SplitRange for BlockedRange<'a, T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn is_divisible(&self) -> bool {
        self.data.len() > self.grain
    }

    fn split(self) -> (Self, Self) {
        let mid = self.data.len() / 2;
        self.split_at(mid)
    }
}

/// Mutable view into a buffer, remembering where it sits in the original.
#[derive(Debug)]
pub struct BlockedRangeMut<'a, T> {
    data: &'a mut [T],
    offset: usize,
    grain: usize,
}

impl<'a, T> BlockedRangeMut<'a, T> {
    /// A range over all of `data`. A grain of zero is treated as one.
    pub fn new(data: &'a mut [T], grain: usize) -> Self {
        Self {
            data,
            offset: 0,
            grain: grain.max(1),
        }
    }

    pub fn into_slice(self) -> &'a mut [T] {
        self.data
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn grain(&self) -> usize {
        self.grain
    }

    /// Splits before local index `mid`.
    ///
    /// # Panics
    ///
    /// Panics if `mid > self.len()`.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        let offset = self.offset;
        let grain = self.grain;
        let (left, right) = self.data.split_at_mut(mid);
        (
            Self {
                data: left,
                offset,
                grain,
            },
            Self {
                data: right,
                offset: offset + mid,
                grain,
            },
        )
    }
}

impl<'a, T: Send> SplitRange for BlockedRangeMut<'a, T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn is_divisible(&self) -> bool {
        self.data.len() > self.grain
    }

    fn split(self) -> (Self, Self) {
        let mid = self.data.len() / 2;
        self.split_at(mid)
    }
}

/// Range of indices, for work that is not tied to a single slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRange {
    range: Range<usize>,
    grain: usize,
}

impl IndexRange {
    /// A grain of zero is treated as one. An inverted range is empty.
    pub fn new(range: Range<usize>, grain: usize) -> Self {
        let end = range.end.max(range.start);
        Self {
            range: range.start..end,
            grain: grain.max(1),
        }
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.range.clone()
    }
}

impl SplitRange for IndexRange {
    fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    fn is_divisible(&self) -> bool {
        self.len() > self.grain
    }

    fn split(self) -> (Self, Self) {
        let mid = self.range.start + self.len() / 2;
        (
            Self {
                range: self.range.start..mid,
                grain: self.grain,
            },
            Self {
                range: mid..self.range.end,
                grain: self.grain,
            },
        )
    }
}
