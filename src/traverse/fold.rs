use crate::simd::{lanes, SimdElement, SimdPack};
use crate::traverse::{BinaryOp, Regions};

/// Two-level fold over scalars and packs.
///
/// `map_scalar` folds one element into the scalar accumulator, `map_vector`
/// folds one aligned pack into a pack-shaped accumulator, and `reduce`
/// collapses that pack accumulator into the scalar one.
pub trait MapReducer<T: SimdElement, U: SimdElement> {
    /// Neutral value broadcast into the pack accumulator before the body.
    fn identity(&self) -> U {
        U::zero()
    }

    fn map_scalar(&self, value: T, acc: &mut U);

    fn map_vector(&self, pack: T::Pack, acc: &mut U::Pack);

    fn reduce(&self, acc: U::Pack, out: &mut U);
}

/// Scalar left fold of `data` with `f`.
///
/// The aligned body is read one pack at a time with aligned loads, but `f`
/// itself is always called on single elements, in index order, so the
/// result is exactly `data.iter().fold(init, f)`.
#[inline(always)]
pub fn simd_accumulate<T, U, F>(data: &[T], init: U, mut f: F) -> U
where
    T: SimdElement,
    F: FnMut(U, T) -> U,
{
    let regions = Regions::of(data);
    let (head, body, tail) = regions.split(data);

    let mut acc = head.iter().fold(init, |acc, &x| f(acc, x));

    for chunk in body.chunks_exact(lanes::<T>()) {
        // SAFETY: body chunks start on a pack boundary and hold LANES values
        let pack = unsafe { T::Pack::load_aligned(chunk.as_ptr()) };
        acc = pack.fold_lanes(acc, &mut f);
    }

    tail.iter().fold(acc, |acc, &x| f(acc, x))
}

/// Reduction of `data` with an associative operation, vectorized in the body.
///
/// The first body pack seeds a pack accumulator that the remaining packs are
/// combined into with [`BinaryOp::vector`]; its lanes are then folded into the
/// running scalar with [`BinaryOp::scalar`]. Grouping differs from a
/// sequential fold, so non-associative operations (floating-point addition in
/// the last bits) may give slightly different results.
#[inline(always)]
pub fn simd_reduce<T, Op>(data: &[T], init: T, op: Op) -> T
where
    T: SimdElement,
    Op: BinaryOp<T>,
{
    let regions = Regions::of(data);
    let (head, body, tail) = regions.split(data);

    let mut acc = head.iter().fold(init, |acc, &x| op.scalar(acc, x));

    let mut packs = body
        .chunks_exact(lanes::<T>())
        // SAFETY: body chunks start on a pack boundary and hold LANES values
        .map(|chunk| unsafe { T::Pack::load_aligned(chunk.as_ptr()) });

    if let Some(first) = packs.next() {
        let folded = packs.fold(first, |a, b| op.vector(a, b));
        acc = folded.fold_lanes(acc, |a, x| op.scalar(a, x));
    }

    tail.iter().fold(acc, |acc, &x| op.scalar(acc, x))
}

/// General map-reduce over `data`.
///
/// 1. the head is mapped element by element into `init`
/// 2. the body is mapped pack by pack into `splat(mapper.identity())`
/// 3. the pack accumulator is reduced into `init`
/// 4. the tail is mapped element by element into `init`
///
/// An empty buffer returns `init` unchanged as long as reducing the identity
/// pack is a no-op.
#[inline(always)]
pub fn simd_map_reduce<T, U, M>(data: &[T], mut init: U, mapper: M) -> U
where
    T: SimdElement,
    U: SimdElement,
    M: MapReducer<T, U>,
{
    let regions = Regions::of(data);
    let (head, body, tail) = regions.split(data);

    let mut buffer = U::Pack::splat(mapper.identity());

    for &value in head {
        mapper.map_scalar(value, &mut init);
    }

    for chunk in body.chunks_exact(lanes::<T>()) {
        // SAFETY: body chunks start on a pack boundary and hold LANES values
        let pack = unsafe { T::Pack::load_aligned(chunk.as_ptr()) };
        mapper.map_vector(pack, &mut buffer);
    }

    mapper.reduce(buffer, &mut init);

    for &value in tail {
        mapper.map_scalar(value, &mut init);
    }

    init
}

impl<T, U, M> MapReducer<T, U> for &M
where
    T: SimdElement,
    U: SimdElement,
    M: MapReducer<T, U> + ?Sized,
{
    #[inline(always)]
    fn identity(&self) -> U {
        (**self).identity()
    }

    #[inline(always)]
    fn map_scalar(&self, value: T, acc: &mut U) {
        (**self).map_scalar(value, acc)
    }

    #[inline(always)]
    fn map_vector(&self, pack: T::Pack, acc: &mut U::Pack) {
        (**self).map_vector(pack, acc)
    }

    #[inline(always)]
    fn reduce(&self, acc: U::Pack, out: &mut U) {
        (**self).reduce(acc, out)
    }
}
