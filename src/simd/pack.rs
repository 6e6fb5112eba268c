//! Portable array-backed pack.
//!
//! `Pack<T, N>` stores `N` lanes in a plain array and implements every
//! operation lane by lane. It carries no alignment of its own: alignment is a
//! property of the buffer it is loaded from, checked against
//! `N * size_of::<T>()`. These loops are simple enough for LLVM to lower them
//! to native vector instructions when the target allows it.

use std::array;
use std::mem;
use std::ops::{Add, Div, Mul, Sub};
use std::ptr;

use crate::simd::{lane_max, lane_min, Alignment, Scalar, SimdPack};

#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(transparent)]
pub struct Pack<T, const N: usize>(pub [T; N]);

impl<T: Copy, const N: usize> Pack<T, N> {
    #[inline(always)]
    pub fn to_array(self) -> [T; N] {
        self.0
    }
}

impl<T, const N: usize> From<[T; N]> for Pack<T, N> {
    #[inline(always)]
    fn from(lanes: [T; N]) -> Self {
        Self(lanes)
    }
}

impl<T: Scalar, const N: usize> Alignment<T> for Pack<T, N> {
    #[inline(always)]
    fn is_aligned(ptr: *const T) -> bool {
        (ptr as usize) % (N * mem::size_of::<T>()) == 0
    }
}

macro_rules! impl_lanewise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar, const N: usize> $trait for Pack<T, N> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self::Output {
                Self(array::from_fn(|i| self.0[i] $op rhs.0[i]))
            }
        }
    };
}

impl_lanewise_op!(Add, add, +);
impl_lanewise_op!(Sub, sub, -);
impl_lanewise_op!(Mul, mul, *);
impl_lanewise_op!(Div, div, /);

impl<T: Scalar, const N: usize> SimdPack<T> for Pack<T, N> {
    const LANES: usize = N;

    const ALIGNMENT: usize = N * mem::size_of::<T>();

    #[inline(always)]
    fn splat(value: T) -> Self {
        Self([value; N])
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const T) -> Self {
        debug_assert!(
            Self::is_aligned(ptr),
            "Pointer must be aligned to {} bytes",
            N * mem::size_of::<T>()
        );

        Self(unsafe { ptr::read(ptr as *const [T; N]) })
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const T) -> Self {
        Self(unsafe { ptr::read_unaligned(ptr as *const [T; N]) })
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut T) {
        debug_assert!(
            Self::is_aligned(ptr),
            "Pointer must be aligned to {} bytes",
            N * mem::size_of::<T>()
        );

        unsafe { ptr::write(ptr as *mut [T; N], self.0) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut T) {
        unsafe { ptr::write_unaligned(ptr as *mut [T; N], self.0) }
    }

    #[inline(always)]
    fn simd_min(self, other: Self) -> Self {
        Self(array::from_fn(|i| lane_min(self.0[i], other.0[i])))
    }

    #[inline(always)]
    fn simd_max(self, other: Self) -> Self {
        Self(array::from_fn(|i| lane_max(self.0[i], other.0[i])))
    }

    #[inline(always)]
    fn fold_lanes<U, F>(self, init: U, f: F) -> U
    where
        F: FnMut(U, T) -> U,
    {
        self.0.into_iter().fold(init, f)
    }
}
