//! Alignment-aware SIMD traversal of flat buffers.
//!
//! Every primitive in this module walks its buffer in three contiguous regions:
//!
//! ```text
//! --------- | ------- | ---------
//! unaligned | aligned | unaligned
//!   head    |  body   |   tail
//!           ^ ------------------- aligned_begin
//!                     ^---------- aligned_end
//! ```
//!
//! The head and tail are processed one scalar at a time. The body starts at
//! the first address aligned to the pack width and holds a whole number of
//! packs, so it is read with aligned vector loads. Element order is always
//! head, body (in lane-sized strides), tail, which is plain index order.
//!
//! When the buffer is shorter than the distance to the next aligned address,
//! `aligned_begin` is clamped to the end of the buffer and every element goes
//! through the scalar path. The result is identical to a scalar loop.

use std::ops::Range;

use crate::simd::{lanes, SimdElement, SimdPack};

pub mod fold;
pub mod for_each;
pub mod ops;
pub mod transform;

pub use fold::{simd_accumulate, simd_map_reduce, simd_reduce, MapReducer};
pub use for_each::{simd_for_each, simd_for_each_mut, EachLane, Visit, VisitMut};
pub use ops::{Divide, Max, Min, Minus, Offset, Plus, Scale, SumMapper, SumOfSquares, Times};
pub use transform::{
    simd_transform, simd_transform2, simd_transform_in_place, try_simd_transform,
    try_simd_transform2, BinaryOp, UnaryOp,
};

/// Head / body / tail split of one buffer, as element indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Regions {
    aligned_begin: usize,
    aligned_end: usize,
    len: usize,
}

impl Regions {
    /// Regions of `data` for the pack its element type is traversed with.
    #[inline(always)]
    pub fn of<T: SimdElement>(data: &[T]) -> Self {
        Self::new(
            data.as_ptr(),
            data.len(),
            lanes::<T>(),
            <T::Pack as SimdPack<T>>::ALIGNMENT,
        )
    }

    /// Regions of the `len` elements starting at `ptr`, for packs of `lanes`
    /// elements that must sit on `alignment`-byte boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or `lanes` is zero.
    #[inline(always)]
    pub fn new<T>(ptr: *const T, len: usize, lanes: usize, alignment: usize) -> Self {
        assert!(lanes > 0, "Lane count must be at least 1");

        // align_offset may report usize::MAX when no aligned element exists;
        // clamping sends the whole buffer through the scalar path
        let aligned_begin = ptr.align_offset(alignment).min(len);
        let aligned_end = aligned_begin + (len - aligned_begin) / lanes * lanes;

        Self {
            aligned_begin,
            aligned_end,
            len,
        }
    }

    #[inline(always)]
    pub fn aligned_begin(&self) -> usize {
        self.aligned_begin
    }

    #[inline(always)]
    pub fn aligned_end(&self) -> usize {
        self.aligned_end
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn head(&self) -> Range<usize> {
        0..self.aligned_begin
    }

    #[inline(always)]
    pub fn body(&self) -> Range<usize> {
        self.aligned_begin..self.aligned_end
    }

    #[inline(always)]
    pub fn tail(&self) -> Range<usize> {
        self.aligned_end..self.len
    }

    /// Splits `data` into its head, body and tail slices.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than the buffer the regions were computed for.
    #[inline(always)]
    pub fn split<'a, T>(&self, data: &'a [T]) -> (&'a [T], &'a [T], &'a [T]) {
        let (head, rest) = data[..self.len].split_at(self.aligned_begin);
        let (body, tail) = rest.split_at(self.aligned_end - self.aligned_begin);
        (head, body, tail)
    }

    /// Mutable counterpart of [`Regions::split`].
    #[inline(always)]
    pub fn split_mut<'a, T>(&self, data: &'a mut [T]) -> (&'a mut [T], &'a mut [T], &'a mut [T]) {
        let (head, rest) = data[..self.len].split_at_mut(self.aligned_begin);
        let (body, tail) = rest.split_at_mut(self.aligned_end - self.aligned_begin);
        (head, body, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::Alignment;

    #[test]
    fn test_regions_invariants_for_every_offset() {
        let n = lanes::<f32>();
        let buffer = vec![0.0f32; 8 * n];

        for start in 0..2 * n {
            for len in 0..=(4 * n + 3) {
                let data = &buffer[start..start + len];
                let r = Regions::of(data);

                assert!(r.aligned_begin() <= r.aligned_end());
                assert!(r.aligned_end() <= r.len());
                assert_eq!((r.aligned_end() - r.aligned_begin()) % n, 0);

                if r.aligned_end() > r.aligned_begin() {
                    let ptr = data[r.aligned_begin()..].as_ptr();
                    assert!(<<f32 as SimdElement>::Pack>::is_aligned(ptr));
                }
            }
        }
    }

    #[test]
    fn test_short_buffer_is_all_scalar() {
        // 16-byte packs of 4 lanes, start one element past an aligned address
        let r = Regions::new(4usize as *const f32, 3, 4, 16);

        assert_eq!(r.aligned_begin(), 3);
        assert_eq!(r.aligned_end(), 3);
        assert!(r.body().is_empty());
        assert!(r.tail().is_empty());
    }

    #[test]
    fn test_regions_with_fixed_layout() {
        // address 8 with 16-byte alignment and 4-lane f32 packs: head of 2
        let r = Regions::new(8usize as *const f32, 13, 4, 16);

        assert_eq!(r.head(), 0..2);
        assert_eq!(r.body(), 2..10);
        assert_eq!(r.tail(), 10..13);
    }

    #[test]
    fn test_empty_regions() {
        let data: [f64; 0] = [];
        let r = Regions::of(&data);

        assert!(r.is_empty());
        assert_eq!(r.aligned_begin(), 0);
        assert_eq!(r.aligned_end(), 0);
    }

    #[test]
    fn test_split_reassembles_buffer() {
        let data: Vec<i32> = (0..37).collect();
        let r = Regions::of(&data[1..]);
        let (head, body, tail) = r.split(&data[1..]);

        let joined: Vec<i32> = head.iter().chain(body).chain(tail).copied().collect();
        assert_eq!(joined, data[1..].to_vec());
    }
}
