//! SIMD boundary consumed by the traversal engine.
//!
//! The engine only needs five capabilities from a vector type: a lane count, an
//! aligned load/store, a broadcast and an alignment check. They are gathered in
//! [`SimdPack`]. Each [`SimdElement`] picks the pack it is traversed with:
//!
//! - `f32` on AVX2 hosts uses [`avx2::f32x8::F32x8`] (`__m256`)
//! - `f32` on NEON hosts uses [`neon::f32x4::F32x4`] (`float32x4_t`)
//! - every other element type, and `f32` elsewhere, uses the portable
//!   array-backed [`Pack`], sized to [`VECTOR_BYTES`]
//!
//! # Conditional Compilation
//!
//! The build script probes the host CPU and emits exactly one of the
//! `avx512`, `avx2`, `sse`, `neon` or `fallback` cfg flags. [`VECTOR_BYTES`]
//! follows the widest available register file.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod pack;

pub use pack::Pack;

/// Width in bytes of the vector registers the packs are sized for.
#[cfg(avx512)]
pub const VECTOR_BYTES: usize = 64;

/// Width in bytes of the vector registers the packs are sized for.
#[cfg(avx2)]
pub const VECTOR_BYTES: usize = 32;

/// Width in bytes of the vector registers the packs are sized for.
#[cfg(not(any(avx512, avx2)))]
pub const VECTOR_BYTES: usize = 16;

/// Scalar arithmetic types the engine can traverse.
pub trait Scalar: Copy + Debug + Send + Sync + PartialOrd + num::Num + 'static {}

impl<T> Scalar for T where T: Copy + Debug + Send + Sync + PartialOrd + num::Num + 'static {}

/// Alignment check for the pointer a pack is loaded from or stored to.
pub trait Alignment<T> {
    fn is_aligned(ptr: *const T) -> bool;
}

/// A packed vector of `LANES` scalars of type `T`.
///
/// Arithmetic operators act lane-wise. Loads and stores are raw-pointer based;
/// the traversal engine guarantees the preconditions listed on each method.
pub trait SimdPack<T: Scalar>:
    Copy
    + Debug
    + Send
    + Sync
    + Alignment<T>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Number of scalars held by one pack.
    const LANES: usize;

    /// Byte boundary required by [`SimdPack::load_aligned`] and
    /// [`SimdPack::store_aligned`]. Always `LANES * size_of::<T>()`.
    const ALIGNMENT: usize;

    /// Broadcasts `value` to every lane.
    fn splat(value: T) -> Self;

    /// # Safety
    ///
    /// `ptr` must be aligned to [`SimdPack::ALIGNMENT`] and point to at least
    /// `LANES` readable values.
    unsafe fn load_aligned(ptr: *const T) -> Self;

    /// # Safety
    ///
    /// `ptr` must point to at least `LANES` readable values.
    unsafe fn load_unaligned(ptr: *const T) -> Self;

    /// # Safety
    ///
    /// `ptr` must be aligned to [`SimdPack::ALIGNMENT`] and point to at least
    /// `LANES` writable values.
    unsafe fn store_aligned(self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must point to at least `LANES` writable values.
    unsafe fn store_unaligned(self, ptr: *mut T);

    /// Lane-wise [`lane_min`]: a lane that is NaN in one operand takes the
    /// other operand's value.
    fn simd_min(self, other: Self) -> Self;

    /// Lane-wise [`lane_max`], with the same NaN rule as [`SimdPack::simd_min`].
    fn simd_max(self, other: Self) -> Self;

    /// Folds the lanes in index order, lane 0 first.
    fn fold_lanes<U, F>(self, init: U, f: F) -> U
    where
        F: FnMut(U, T) -> U;

    /// Loads `LANES` values, picking the aligned instruction when `ptr` allows it.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `LANES` readable values.
    #[inline(always)]
    unsafe fn load(ptr: *const T) -> Self {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match Self::is_aligned(ptr) {
            true => unsafe { Self::load_aligned(ptr) },
            false => unsafe { Self::load_unaligned(ptr) },
        }
    }

    /// Stores `LANES` values, picking the aligned instruction when `ptr` allows it.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `LANES` writable values.
    #[inline(always)]
    unsafe fn store(self, ptr: *mut T) {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match Self::is_aligned(ptr) {
            true => unsafe { self.store_aligned(ptr) },
            false => unsafe { self.store_unaligned(ptr) },
        }
    }

    /// Loads the first `LANES` values of `slice`.
    ///
    /// # Panics
    ///
    /// Panics if `slice` holds fewer than `LANES` values.
    #[inline(always)]
    fn from_slice(slice: &[T]) -> Self {
        assert!(
            slice.len() >= Self::LANES,
            "Slice must hold at least {} elements",
            Self::LANES
        );

        // SAFETY: the slice holds at least LANES readable values
        unsafe { Self::load(slice.as_ptr()) }
    }

    /// Writes the lanes into the first `LANES` slots of `slice`.
    ///
    /// # Panics
    ///
    /// Panics if `slice` holds fewer than `LANES` values.
    #[inline(always)]
    fn write_to_slice(self, slice: &mut [T]) {
        assert!(
            slice.len() >= Self::LANES,
            "Slice must hold at least {} elements",
            Self::LANES
        );

        // SAFETY: the slice holds at least LANES writable values
        unsafe { self.store(slice.as_mut_ptr()) }
    }

    /// Horizontal sum, accumulated in lane order.
    #[inline(always)]
    fn reduce_sum(self) -> T {
        self.fold_lanes(T::zero(), |acc, x| acc + x)
    }
}

/// `true` for values that do not compare equal to themselves (NaN).
#[inline(always)]
pub fn is_unordered<T: PartialOrd>(value: &T) -> bool {
    value.partial_cmp(value).is_none()
}

/// Smaller of `a` and `b`, ignoring an unordered operand.
///
/// Returns `a` when the two compare equal, so `-0.0` and `0.0` keep their
/// operand order. Only yields NaN when both operands are NaN.
#[inline(always)]
pub fn lane_min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a || is_unordered(&a) {
        b
    } else {
        a
    }
}

/// Larger of `a` and `b`, ignoring an unordered operand.
#[inline(always)]
pub fn lane_max<T: PartialOrd>(a: T, b: T) -> T {
    if b > a || is_unordered(&a) {
        b
    } else {
        a
    }
}

/// An element type together with the pack it is traversed with.
pub trait SimdElement: Scalar {
    type Pack: SimdPack<Self>;
}

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
impl SimdElement for f32 {
    type Pack = avx2::f32x8::F32x8;
}

#[cfg(all(neon, target_arch = "aarch64"))]
impl SimdElement for f32 {
    type Pack = neon::f32x4::F32x4;
}

#[cfg(not(any(
    all(avx2, any(target_arch = "x86", target_arch = "x86_64")),
    all(neon, target_arch = "aarch64")
)))]
impl SimdElement for f32 {
    type Pack = Pack<f32, { VECTOR_BYTES / std::mem::size_of::<f32>() }>;
}

macro_rules! impl_portable_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl SimdElement for $t {
                type Pack = Pack<$t, { VECTOR_BYTES / std::mem::size_of::<$t>() }>;
            }
        )*
    };
}

impl_portable_element!(f64, i8, i16, i32, i64, u8, u16, u32, u64);

/// Lane count used for `T` on this build.
#[inline(always)]
pub const fn lanes<T: SimdElement>() -> usize {
    <T::Pack as SimdPack<T>>::LANES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packs_fill_the_vector_register() {
        assert_eq!(lanes::<f64>() * 8, VECTOR_BYTES);
        assert_eq!(lanes::<i32>() * 4, VECTOR_BYTES);
        assert_eq!(lanes::<u8>(), VECTOR_BYTES);
        assert_eq!(<<f64 as SimdElement>::Pack as SimdPack<f64>>::ALIGNMENT, VECTOR_BYTES);
    }

    #[test]
    fn test_f32_lanes_match_alignment() {
        let lanes = lanes::<f32>();
        let alignment = <<f32 as SimdElement>::Pack as SimdPack<f32>>::ALIGNMENT;

        assert_eq!(lanes * std::mem::size_of::<f32>(), alignment);
        assert!(alignment.is_power_of_two());
    }

    #[test]
    fn test_from_slice_and_write_to_slice() {
        let n = lanes::<f32>();
        let data: Vec<f32> = (0..n + 3).map(|i| i as f32).collect();

        // offset by one so the load is unaligned at least on some hosts
        let pack = <f32 as SimdElement>::Pack::from_slice(&data[1..]);
        let mut out = vec![0.0f32; n];
        pack.write_to_slice(&mut out);

        assert_eq!(&out[..], &data[1..=n]);
    }

    #[test]
    #[should_panic(expected = "Slice must hold at least")]
    fn test_from_slice_too_short_panics() {
        let n = lanes::<i32>();
        let data = vec![1i32; n - 1];
        let _ = <i32 as SimdElement>::Pack::from_slice(&data);
    }

    #[test]
    fn test_reduce_sum_and_minmax() {
        let n = lanes::<f32>();
        let a: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..n).map(|i| (n - i) as f32).collect();

        let pa = <f32 as SimdElement>::Pack::from_slice(&a);
        let pb = <f32 as SimdElement>::Pack::from_slice(&b);

        let expected: f32 = a.iter().sum();
        assert_eq!(pa.reduce_sum(), expected);

        let mut min = vec![0.0f32; n];
        let mut max = vec![0.0f32; n];
        pa.simd_min(pb).write_to_slice(&mut min);
        pa.simd_max(pb).write_to_slice(&mut max);

        for i in 0..n {
            assert_eq!(min[i], a[i].min(b[i]));
            assert_eq!(max[i], a[i].max(b[i]));
        }
    }

    #[test]
    fn test_minmax_ignore_nan_in_either_operand() {
        let n = lanes::<f32>();
        let a: Vec<f32> = (0..n).map(|i| if i % 2 == 0 { f32::NAN } else { i as f32 }).collect();
        let b: Vec<f32> = (0..n).map(|i| if i % 3 == 0 { f32::NAN } else { -(i as f32) }).collect();

        let pa = <f32 as SimdElement>::Pack::from_slice(&a);
        let pb = <f32 as SimdElement>::Pack::from_slice(&b);

        for (x, y) in [(pa, pb), (pb, pa)] {
            let mut min = vec![0.0f32; n];
            let mut max = vec![0.0f32; n];
            x.simd_min(y).write_to_slice(&mut min);
            x.simd_max(y).write_to_slice(&mut max);

            for i in 0..n {
                let expected_min = a[i].min(b[i]);
                let expected_max = a[i].max(b[i]);
                assert_eq!(min[i].is_nan(), expected_min.is_nan(), "lane {i}");
                assert_eq!(max[i].is_nan(), expected_max.is_nan(), "lane {i}");
                if !expected_min.is_nan() {
                    assert_eq!(min[i], expected_min, "lane {i}");
                    assert_eq!(max[i], expected_max, "lane {i}");
                }
            }
        }
    }

    #[test]
    fn test_scalar_lane_rules() {
        assert_eq!(lane_min(f64::NAN, 1.0), 1.0);
        assert_eq!(lane_min(1.0, f64::NAN), 1.0);
        assert_eq!(lane_max(f64::NAN, -1.0), -1.0);
        assert_eq!(lane_max(-1.0, f64::NAN), -1.0);
        assert!(lane_min(f32::NAN, f32::NAN).is_nan());
        assert_eq!(lane_min(3, -4), -4);
        assert_eq!(lane_max(3u8, 4), 4);
        assert!(!is_unordered(&0.0f32));
    }

    #[test]
    fn test_arithmetic_is_lanewise() {
        let n = lanes::<f32>();
        let a: Vec<f32> = (1..=n).map(|i| i as f32).collect();
        let two = <f32 as SimdElement>::Pack::splat(2.0);
        let pa = <f32 as SimdElement>::Pack::from_slice(&a);

        let mut out = vec![0.0f32; n];
        ((pa + two) * two - pa / two).write_to_slice(&mut out);

        for i in 0..n {
            assert_eq!(out[i], (a[i] + 2.0) * 2.0 - a[i] / 2.0);
        }
    }
}
