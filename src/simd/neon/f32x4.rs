//! NEON 4-lane f32 SIMD vector implementation.
//!
//! `F32x4` wraps the `float32x4_t` register type. `vld1q_f32` / `vst1q_f32`
//! accept any address, so the aligned entry points differ from the unaligned
//! ones only by a debug check. Min and max use `vminnmq_f32` / `vmaxnmq_f32`,
//! which return the other operand when one lane is NaN.

use std::arch::aarch64::*;

use std::ops::{Add, Div, Mul, Sub};

use crate::simd::{Alignment, SimdPack};

/// NEON memory alignment the traversal body is laid out on, in bytes.
pub(crate) const NEON_ALIGNMENT: usize = 16;

/// Number of f32 elements that fit in a NEON 128-bit vector.
pub(crate) const LANE_COUNT: usize = 4;

/// A SIMD vector of 4 32-bit floating point values
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    pub elements: float32x4_t,
}

impl Alignment<f32> for F32x4 {
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % NEON_ALIGNMENT == 0
    }
}

impl F32x4 {
    /// Copies the lanes out, lane 0 first.
    #[inline(always)]
    pub fn to_array(self) -> [f32; LANE_COUNT] {
        let mut lanes = [0.0f32; LANE_COUNT];

        // SAFETY: `lanes` holds exactly LANE_COUNT writable f32 values
        unsafe { vst1q_f32(lanes.as_mut_ptr(), self.elements) };

        lanes
    }
}

impl SimdPack<f32> for F32x4 {
    const LANES: usize = LANE_COUNT;

    const ALIGNMENT: usize = NEON_ALIGNMENT;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { vdupq_n_f32(value) },
        }
    }

    // NEON has a single load instruction for both cases; the aligned entry
    // point only adds the debug check.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(F32x4::is_aligned(ptr), "Pointer must be 16-byte aligned");

        Self {
            elements: unsafe { vld1q_f32(ptr) },
        }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self {
            elements: unsafe { vld1q_f32(ptr) },
        }
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert!(F32x4::is_aligned(ptr), "Pointer must be 16-byte aligned");

        unsafe { vst1q_f32(ptr, self.elements) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        unsafe { vst1q_f32(ptr, self.elements) }
    }

    #[inline(always)]
    fn simd_min(self, other: Self) -> Self {
        Self {
            elements: unsafe { vminnmq_f32(self.elements, other.elements) },
        }
    }

    #[inline(always)]
    fn simd_max(self, other: Self) -> Self {
        Self {
            elements: unsafe { vmaxnmq_f32(self.elements, other.elements) },
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

impl Add for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vaddq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vsubq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vmulq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vdivq_f32(self.elements, rhs.elements) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_store_roundtrip() {
        let original = [1.0f32, -2.0, 3.5, 4.25];
        let vec = unsafe { F32x4::load_unaligned(original.as_ptr()) };

        let mut result = [0.0f32; 4];
        unsafe { vec.store_unaligned(result.as_mut_ptr()) };

        assert_eq!(result, original);
    }

    #[test]
    fn test_fold_lanes_in_order() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let vec = unsafe { F32x4::load_unaligned(data.as_ptr()) };

        let collected = vec.fold_lanes(Vec::new(), |mut acc, x| {
            acc.push(x);
            acc
        });

        assert_eq!(collected, data.to_vec());
        assert_eq!(vec.reduce_sum(), 10.0);
    }

    #[test]
    fn test_minmax_skip_nan_lanes() {
        let a = [f32::NAN, 1.0, f32::NAN, 5.0];
        let b = [3.0, f32::NAN, f32::NAN, -5.0];

        let pa = unsafe { F32x4::load_unaligned(a.as_ptr()) };
        let pb = unsafe { F32x4::load_unaligned(b.as_ptr()) };

        let min = pa.simd_min(pb).to_array();
        let max = pb.simd_max(pa).to_array();

        assert_eq!(min[0], 3.0);
        assert_eq!(min[1], 1.0);
        assert!(min[2].is_nan());
        assert_eq!(min[3], -5.0);
        assert_eq!(max[0], 3.0);
        assert_eq!(max[1], 1.0);
        assert_eq!(max[3], 5.0);
    }
}
