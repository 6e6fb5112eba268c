//! Accumulators and helpers that compose the reducer with the traversal engine.
//!
//! Every leaf runs one of the single-threaded SIMD primitives over its own
//! sub-slice, so each leaf again gets its own head / body / tail split.

use tracing::debug;

use crate::config::Grain;
use crate::parallel::{
    parallel_for, parallel_reduce, Accumulator, BlockedRange, BlockedRangeMut, ForkJoin, Rayon,
    ReduceBody,
};
use crate::simd::{lane_max, lane_min, SimdElement};
use crate::traverse::{
    simd_map_reduce, simd_reduce, simd_transform, simd_transform_in_place, Max, Min, SumMapper,
    UnaryOp,
};

/// Running sum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sum<T> {
    total: T,
}

impl<T: SimdElement> Sum<T> {
    pub fn value(&self) -> T {
        self.total
    }
}

impl<T: SimdElement> Default for Sum<T> {
    fn default() -> Self {
        Self { total: T::zero() }
    }
}

impl<T: SimdElement> Accumulator for Sum<T> {
    fn join(&mut self, rhs: Self) {
        self.total = self.total + rhs.total;
    }
}

impl<'a, T: SimdElement> ReduceBody<BlockedRange<'a, T>> for Sum<T> {
    fn fold(&mut self, range: BlockedRange<'a, T>) {
        self.total = simd_map_reduce(range.as_slice(), self.total, SumMapper);
    }
}

/// Smallest and largest element seen so far, `None` until the first one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MinMax<T> {
    bounds: Option<(T, T)>,
}

impl<T: SimdElement> MinMax<T> {
    pub fn value(&self) -> Option<(T, T)> {
        self.bounds
    }

    fn merge(&mut self, lo: T, hi: T) {
        self.bounds = Some(match self.bounds {
            Some((min, max)) => (lane_min(min, lo), lane_max(max, hi)),
            None => (lo, hi),
        });
    }
}

impl<T> Default for MinMax<T> {
    fn default() -> Self {
        Self { bounds: None }
    }
}

impl<T: SimdElement> Accumulator for MinMax<T> {
    fn join(&mut self, rhs: Self) {
        if let Some((lo, hi)) = rhs.bounds {
            self.merge(lo, hi);
        }
    }
}

impl<'a, T: SimdElement> ReduceBody<BlockedRange<'a, T>> for MinMax<T> {
    fn fold(&mut self, range: BlockedRange<'a, T>) {
        let slice = range.as_slice();
        if let Some(&first) = slice.first() {
            let lo = simd_reduce(slice, first, Min);
            let hi = simd_reduce(slice, first, Max);
            self.merge(lo, hi);
        }
    }
}

/// Sum of `data` on rayon's global pool with an automatic grain.
pub fn parallel_sum<T: SimdElement>(data: &[T]) -> T {
    parallel_sum_with(data, Grain::Auto, &Rayon)
}

/// Sum of `data` with an explicit grain and scheduler.
///
/// Addition is regrouped per leaf and per lane, so floating-point results can
/// differ from a sequential sum in the last bits. For a fixed grain and
/// length the grouping is fixed, which makes the result reproducible across
/// schedulers.
pub fn parallel_sum_with<T, S>(data: &[T], grain: Grain, scheduler: &S) -> T
where
    T: SimdElement,
    S: ForkJoin,
{
    let grain = grain.resolve(data.len(), scheduler.num_threads());
    debug!(len = data.len(), grain, threads = scheduler.num_threads(), "parallel sum");

    parallel_reduce(BlockedRange::new(data, grain), Sum::default(), scheduler).value()
}

/// `(min, max)` of `data` on rayon's global pool, `None` when empty.
pub fn parallel_min_max<T: SimdElement>(data: &[T]) -> Option<(T, T)> {
    parallel_min_max_with(data, Grain::Auto, &Rayon)
}

/// `(min, max)` of `data` with an explicit grain and scheduler.
pub fn parallel_min_max_with<T, S>(data: &[T], grain: Grain, scheduler: &S) -> Option<(T, T)>
where
    T: SimdElement,
    S: ForkJoin,
{
    let grain = grain.resolve(data.len(), scheduler.num_threads());
    debug!(len = data.len(), grain, threads = scheduler.num_threads(), "parallel min/max");

    parallel_reduce(BlockedRange::new(data, grain), MinMax::default(), scheduler).value()
}

/// Parallel [`simd_transform`]: the output is split into disjoint leaves and
/// every leaf transforms the matching part of `input`.
///
/// # Panics
///
/// Panics if `out` is shorter than `input`.
pub fn par_simd_transform<T, Op, S>(
    input: &[T],
    out: &mut [T],
    op: Op,
    grain: Grain,
    scheduler: &S,
) -> usize
where
    T: SimdElement,
    Op: UnaryOp<T> + Sync,
    S: ForkJoin,
{
    let len = input.len();
    assert!(
        out.len() >= len,
        "Output must hold at least {len} elements, got {}",
        out.len()
    );

    let grain = grain.resolve(len, scheduler.num_threads());
    debug!(len, grain, threads = scheduler.num_threads(), "parallel transform");

    parallel_for(
        BlockedRangeMut::new(&mut out[..len], grain),
        |leaf| {
            let offset = leaf.offset();
            let dst = leaf.into_slice();
            simd_transform(&input[offset..offset + dst.len()], dst, &op);
        },
        scheduler,
    );

    len
}

/// Parallel [`simd_transform_in_place`].
pub fn par_simd_transform_in_place<T, Op, S>(data: &mut [T], op: Op, grain: Grain, scheduler: &S)
where
    T: SimdElement,
    Op: UnaryOp<T> + Sync,
    S: ForkJoin,
{
    let grain = grain.resolve(data.len(), scheduler.num_threads());
    debug!(
        len = data.len(),
        grain,
        threads = scheduler.num_threads(),
        "parallel transform in place"
    );

    parallel_for(
        BlockedRangeMut::new(data, grain),
        |leaf| simd_transform_in_place(leaf.into_slice(), &op),
        scheduler,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::{RayonPool, Sequential};
    use crate::traverse::{Offset, Scale};

    mod sum {
        use super::*;

        #[test]
        fn test_small_sum() {
            assert_eq!(parallel_sum(&[1.0f64, 2.0, 3.0, 4.0, 5.0]), 15.0);
            assert_eq!(parallel_sum::<i32>(&[]), 0);
        }

        #[test]
        fn test_integer_sum_matches_iterator() {
            let data: Vec<i64> = (0..100_003).map(|i| i % 97 - 48).collect();
            let grain = Grain::fixed(1_000).unwrap();

            let expected: i64 = data.iter().sum();
            assert_eq!(parallel_sum_with(&data, grain, &Rayon), expected);
            assert_eq!(parallel_sum_with(&data, grain, &Sequential), expected);
        }

        #[test]
        fn test_float_sum_is_scheduler_independent() {
            let data: Vec<f32> = (0..50_000).map(|i| (i as f32 * 0.37).sin()).collect();
            let grain = Grain::fixed(777).unwrap();
            let pool = RayonPool::new(3).unwrap();

            let sequential = parallel_sum_with(&data, grain, &Sequential);
            assert_eq!(parallel_sum_with(&data, grain, &pool).to_bits(), sequential.to_bits());
            assert_eq!(parallel_sum_with(&data, grain, &Rayon).to_bits(), sequential.to_bits());
        }
    }

    mod min_max {
        use super::*;

        #[test]
        fn test_min_max() {
            let mut data: Vec<i32> = (0..10_000).map(|i| (i * 7919) % 10_007).collect();
            data[4321] = -5;
            data[17] = 20_000;

            assert_eq!(parallel_min_max(&data), Some((-5, 20_000)));
            assert_eq!(
                parallel_min_max_with(&data, Grain::fixed(64).unwrap(), &Sequential),
                Some((-5, 20_000))
            );
        }

        #[test]
        fn test_empty_is_none() {
            assert_eq!(parallel_min_max::<f64>(&[]), None);
        }
    }

    mod transform {
        use super::*;

        #[test]
        fn test_par_transform_matches_sequential() {
            let input: Vec<f64> = (0..12_345).map(|i| i as f64).collect();
            let mut expected = vec![0.0; input.len()];
            let mut actual = vec![0.0; input.len() + 3];

            simd_transform(&input[1..], &mut expected[1..], Scale(0.5));
            let grain = Grain::fixed(100).unwrap();
            let written = par_simd_transform(&input[1..], &mut actual, Scale(0.5), grain, &Rayon);

            assert_eq!(written, input.len() - 1);
            assert_eq!(&actual[..written], &expected[1..]);
            assert_eq!(&actual[written..], &[0.0; 4]);
        }

        #[test]
        fn test_par_transform_in_place() {
            let mut data: Vec<u32> = (0..5_000).collect();
            par_simd_transform_in_place(&mut data[3..], Offset(10), Grain::Auto, &Rayon);

            assert_eq!(&data[..3], &[0, 1, 2]);
            assert!(data[3..].iter().enumerate().all(|(i, &x)| x == i as u32 + 13));
        }

        #[test]
        #[should_panic(expected = "Output must hold at least")]
        fn test_par_transform_short_output_panics() {
            let mut out = [0i32; 2];
            par_simd_transform(&[1, 2, 3], &mut out, Offset(1), Grain::default(), &Sequential);
        }
    }
}
