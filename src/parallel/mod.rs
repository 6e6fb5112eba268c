//! Splittable fork-join reducer.
//!
//! A [`SplitRange`] is halved recursively until it is no longer divisible.
//! Each leaf folds its sub-range into an accumulator it owns exclusively. On
//! the way back up, the right child's accumulator is joined into the left
//! one, so partial results combine in the same left-to-right order a
//! sequential fold would see, whatever order the leaves actually ran in.
//!
//! ```text
//!              [0, 8)  acc
//!             /       \
//!      [0, 4) acc    [4, 8) acc.split()
//!         |              |
//!       fold           fold
//!             \       /
//!        acc.join(right)
//! ```

use tracing::trace;

pub mod accumulators;
pub mod range;
pub mod scheduler;

pub use accumulators::{
    par_simd_transform, par_simd_transform_in_place, parallel_min_max, parallel_min_max_with,
    parallel_sum, parallel_sum_with, MinMax, Sum,
};
pub use range::{BlockedRange, BlockedRangeMut, IndexRange, SplitRange};
pub use scheduler::{ForkJoin, Rayon, RayonPool, Sequential};

/// Partial result that can be forked for a right-hand sibling and merged back.
pub trait Accumulator: Default + Send {
    /// Fresh accumulator for the right half of a split. The default is the
    /// identity, [`Default::default`].
    fn split(&self) -> Self {
        Self::default()
    }

    /// Merges `rhs`, which covers the elements right after `self`, into `self`.
    fn join(&mut self, rhs: Self);
}

/// Accumulator that knows how to fold one leaf range.
pub trait ReduceBody<R>: Accumulator {
    fn fold(&mut self, range: R);
}

/// Reduces `range` into `body`.
///
/// `body` is the accumulator of the root task; it is returned holding the
/// result. An empty range is a single leaf, so `body` is folded once over
/// nothing and comes back unchanged for any sensible [`ReduceBody`].
///
/// # Panics
///
/// A panic inside a leaf propagates to the caller once its sibling task has
/// finished.
pub fn parallel_reduce<R, B, S>(range: R, body: B, scheduler: &S) -> B
where
    R: SplitRange,
    B: ReduceBody<R>,
    S: ForkJoin,
{
    let fold = |acc: &mut B, leaf: R| acc.fold(leaf);
    scheduler.install(|| reduce_node(range, body, &fold, scheduler))
}

/// Closure form of [`parallel_reduce`]: `fold` is called once per leaf with
/// the accumulator that leaf owns.
pub fn parallel_reduce_with<R, A, F, S>(range: R, init: A, fold: F, scheduler: &S) -> A
where
    R: SplitRange,
    A: Accumulator,
    F: Fn(&mut A, R) + Sync,
    S: ForkJoin,
{
    scheduler.install(|| reduce_node(range, init, &fold, scheduler))
}

fn reduce_node<R, A, F, S>(range: R, mut acc: A, fold: &F, scheduler: &S) -> A
where
    R: SplitRange,
    A: Accumulator,
    F: Fn(&mut A, R) + Sync,
    S: ForkJoin,
{
    if !range.is_divisible() {
        trace!(len = range.len(), "reduce leaf");
        fold(&mut acc, range);
        return acc;
    }

    let sibling = acc.split();
    let (left, right) = range.split();

    let (mut acc, rhs) = scheduler.join(
        move || reduce_node(left, acc, fold, scheduler),
        move || reduce_node(right, sibling, fold, scheduler),
    );

    acc.join(rhs);
    acc
}

/// Calls `f` once for every leaf of `range`, in parallel where the scheduler
/// allows. Leaves are disjoint and together cover the whole range.
pub fn parallel_for<R, F, S>(range: R, f: F, scheduler: &S)
where
    R: SplitRange,
    F: Fn(R) + Sync,
    S: ForkJoin,
{
    scheduler.install(|| for_node(range, &f, scheduler))
}

fn for_node<R, F, S>(range: R, f: &F, scheduler: &S)
where
    R: SplitRange,
    F: Fn(R) + Sync,
    S: ForkJoin,
{
    if !range.is_divisible() {
        trace!(len = range.len(), "for leaf");
        f(range);
        return;
    }

    let (left, right) = range.split();
    scheduler.join(
        move || for_node(left, f, scheduler),
        move || for_node(right, f, scheduler),
    );
}
