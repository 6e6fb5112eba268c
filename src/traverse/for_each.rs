use crate::simd::{lanes, SimdElement, SimdPack};
use crate::traverse::Regions;

/// Read-only visitor receiving either one scalar or one aligned pack.
pub trait Visit<T: SimdElement> {
    fn scalar(&mut self, value: T);
    fn vector(&mut self, pack: T::Pack);
}

/// In-place visitor. Packs handed to [`VisitMut::vector`] are written back to
/// the buffer once the call returns.
pub trait VisitMut<T: SimdElement> {
    fn scalar(&mut self, value: &mut T);
    fn vector(&mut self, pack: &mut T::Pack);
}

/// Adapts a scalar closure into a [`Visit`] that sees packs lane by lane.
pub struct EachLane<F>(pub F);

impl<T, F> Visit<T> for EachLane<F>
where
    T: SimdElement,
    F: FnMut(T),
{
    #[inline(always)]
    fn scalar(&mut self, value: T) {
        (self.0)(value)
    }

    #[inline(always)]
    fn vector(&mut self, pack: T::Pack) {
        pack.fold_lanes((), |(), x| (self.0)(x))
    }
}

/// Visits every element of `data` exactly once, in index order.
///
/// Head and tail elements go to [`Visit::scalar`], the aligned body goes to
/// [`Visit::vector`] one pack at a time. The visitor is returned so its state
/// can be read back.
#[inline(always)]
pub fn simd_for_each<T, V>(data: &[T], mut visitor: V) -> V
where
    T: SimdElement,
    V: Visit<T>,
{
    let regions = Regions::of(data);
    let (head, body, tail) = regions.split(data);

    for &value in head {
        visitor.scalar(value);
    }

    for chunk in body.chunks_exact(lanes::<T>()) {
        // SAFETY: body chunks start on a pack boundary and hold LANES values
        visitor.vector(unsafe { T::Pack::load_aligned(chunk.as_ptr()) });
    }

    for &value in tail {
        visitor.scalar(value);
    }

    visitor
}

/// Mutating counterpart of [`simd_for_each`].
#[inline(always)]
pub fn simd_for_each_mut<T, V>(data: &mut [T], mut visitor: V) -> V
where
    T: SimdElement,
    V: VisitMut<T>,
{
    let regions = Regions::of(data);
    let (head, body, tail) = regions.split_mut(data);

    for value in head.iter_mut() {
        visitor.scalar(value);
    }

    for chunk in body.chunks_exact_mut(lanes::<T>()) {
        // SAFETY: body chunks start on a pack boundary and hold LANES values
        unsafe {
            let mut pack = T::Pack::load_aligned(chunk.as_ptr());
            visitor.vector(&mut pack);
            pack.store_aligned(chunk.as_mut_ptr());
        }
    }

    for value in tail.iter_mut() {
        visitor.scalar(value);
    }

    visitor
}
