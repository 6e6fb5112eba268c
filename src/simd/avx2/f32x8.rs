//! AVX2 8-lane f32 SIMD vector implementation.
//!
//! `F32x8` wraps the `__m256` register type. Aligned accesses go through
//! `_mm256_load_ps` / `_mm256_store_ps`, which fault on addresses that are not
//! 32-byte aligned; the traversal engine only calls them on the aligned body
//! of a buffer.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul, Sub};

use crate::simd::{Alignment, SimdPack};

/// AVX2 memory alignment requirement in bytes.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl Alignment<f32> for F32x8 {
    /// Checks if a pointer is 32-byte aligned.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % core::mem::align_of::<__m256>() == 0
    }
}

impl F32x8 {
    /// Copies the lanes out, lane 0 first.
    #[inline(always)]
    pub fn to_array(self) -> [f32; LANE_COUNT] {
        let mut lanes = [0.0f32; LANE_COUNT];

        // SAFETY: `lanes` holds exactly LANE_COUNT writable f32 values
        unsafe { _mm256_storeu_ps(lanes.as_mut_ptr(), self.elements) };

        lanes
    }
}

impl SimdPack<f32> for F32x8 {
    const LANES: usize = LANE_COUNT;

    const ALIGNMENT: usize = AVX_ALIGNMENT;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { _mm256_set1_ps(value) },
        }
    }

    /// Loads 8 elements from 32-byte aligned memory with `_mm256_load_ps`.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(F32x8::is_aligned(ptr), "Pointer must be 32-byte aligned");

        Self {
            elements: unsafe { _mm256_load_ps(ptr) },
        }
    }

    /// Loads 8 elements from memory of any alignment with `_mm256_loadu_ps`.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self {
            elements: unsafe { _mm256_loadu_ps(ptr) },
        }
    }

    /// Stores 8 elements to 32-byte aligned memory with `_mm256_store_ps`.
    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert!(F32x8::is_aligned(ptr), "Pointer must be 32-byte aligned");

        unsafe { _mm256_store_ps(ptr, self.elements) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        unsafe { _mm256_storeu_ps(ptr, self.elements) }
    }

    /// `_mm256_min_ps(other, self)` returns `self` when either lane is NaN;
    /// the blend then takes `other` where `self` is NaN.
    #[inline(always)]
    fn simd_min(self, other: Self) -> Self {
        Self {
            elements: unsafe {
                let min = _mm256_min_ps(other.elements, self.elements);
                let nan = _mm256_cmp_ps(self.elements, self.elements, _CMP_UNORD_Q);
                _mm256_blendv_ps(min, other.elements, nan)
            },
        }
    }

    /// Same NaN handling as [`F32x8::simd_min`].
    #[inline(always)]
    fn simd_max(self, other: Self) -> Self {
        Self {
            elements: unsafe {
                let max = _mm256_max_ps(other.elements, self.elements);
                let nan = _mm256_cmp_ps(self.elements, self.elements, _CMP_UNORD_Q);
                _mm256_blendv_ps(max, other.elements, nan)
            },
        }
    }

    #[inline(always)]
    fn fold_lanes<U, F>(self, init: U, f: F) -> U
    where
        F: FnMut(U, f32) -> U,
    {
        self.to_array().into_iter().fold(init, f)
    }
}

impl Add for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_add_ps(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_sub_ps(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_mul_ps(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_div_ps(self.elements, rhs.elements) },
        }
    }
}
