use crate::error::{length_mismatch, output_too_small, Result};
use crate::simd::{lanes, SimdElement, SimdPack};
use crate::traverse::Regions;

/// Element-wise operation on one input.
pub trait UnaryOp<T: SimdElement> {
    fn scalar(&self, x: T) -> T;
    fn vector(&self, x: T::Pack) -> T::Pack;
}

/// Element-wise operation on two inputs.
pub trait BinaryOp<T: SimdElement> {
    fn scalar(&self, a: T, b: T) -> T;
    fn vector(&self, a: T::Pack, b: T::Pack) -> T::Pack;
}

impl<T: SimdElement, Op: UnaryOp<T> + ?Sized> UnaryOp<T> for &Op {
    #[inline(always)]
    fn scalar(&self, x: T) -> T {
        (**self).scalar(x)
    }

    #[inline(always)]
    fn vector(&self, x: T::Pack) -> T::Pack {
        (**self).vector(x)
    }
}

impl<T: SimdElement, Op: BinaryOp<T> + ?Sized> BinaryOp<T> for &Op {
    #[inline(always)]
    fn scalar(&self, a: T, b: T) -> T {
        (**self).scalar(a, b)
    }

    #[inline(always)]
    fn vector(&self, a: T::Pack, b: T::Pack) -> T::Pack {
        (**self).vector(a, b)
    }
}

/// Writes `op(input[i])` into `out[i]` for every index of `input`.
///
/// Regions are computed on `input`: its body is read with aligned loads. The
/// output is stored with the aligned instruction whenever its own address
/// allows it. Returns the number of elements written.
///
/// # Panics
///
/// Panics if `out` is shorter than `input`.
#[inline(always)]
pub fn simd_transform<T, Op>(input: &[T], out: &mut [T], op: Op) -> usize
where
    T: SimdElement,
    Op: UnaryOp<T>,
{
    let len = input.len();
    assert!(
        out.len() >= len,
        "Output must hold at least {len} elements, got {}",
        out.len()
    );

    let regions = Regions::of(input);
    let (head_in, body_in, tail_in) = regions.split(input);
    let (head_out, body_out, tail_out) = regions.split_mut(&mut out[..len]);

    for (dst, &src) in head_out.iter_mut().zip(head_in) {
        *dst = op.scalar(src);
    }

    let step = lanes::<T>();
    for (src, dst) in body_in.chunks_exact(step).zip(body_out.chunks_exact_mut(step)) {
        // SAFETY: `src` starts on a pack boundary, both chunks hold LANES values
        unsafe {
            let pack = T::Pack::load_aligned(src.as_ptr());
            op.vector(pack).store(dst.as_mut_ptr());
        }
    }

    for (dst, &src) in tail_out.iter_mut().zip(tail_in) {
        *dst = op.scalar(src);
    }

    len
}

/// Writes `op(a[i], b[i])` into `out[i]` for every index of `a`.
///
/// Regions are computed on `a`; `b` and `out` may sit at any alignment.
///
/// # Panics
///
/// Panics if `a` and `b` differ in length or `out` is shorter than `a`.
#[inline(always)]
pub fn simd_transform2<T, Op>(a: &[T], b: &[T], out: &mut [T], op: Op) -> usize
where
    T: SimdElement,
    Op: BinaryOp<T>,
{
    assert_eq!(a.len(), b.len(), "Vectors must be the same length");

    let len = a.len();
    assert!(
        out.len() >= len,
        "Output must hold at least {len} elements, got {}",
        out.len()
    );

    let regions = Regions::of(a);
    let (head_a, body_a, tail_a) = regions.split(a);
    let (head_b, body_b, tail_b) = regions.split(b);
    let (head_out, body_out, tail_out) = regions.split_mut(&mut out[..len]);

    for ((dst, &x), &y) in head_out.iter_mut().zip(head_a).zip(head_b) {
        *dst = op.scalar(x, y);
    }

    let step = lanes::<T>();
    for ((x, y), dst) in body_a
        .chunks_exact(step)
        .zip(body_b.chunks_exact(step))
        .zip(body_out.chunks_exact_mut(step))
    {
        // SAFETY: `x` starts on a pack boundary, all chunks hold LANES values
        unsafe {
            let px = T::Pack::load_aligned(x.as_ptr());
            let py = T::Pack::load(y.as_ptr());
            op.vector(px, py).store(dst.as_mut_ptr());
        }
    }

    for ((dst, &x), &y) in tail_out.iter_mut().zip(tail_a).zip(tail_b) {
        *dst = op.scalar(x, y);
    }

    len
}

/// Replaces every element of `data` with `op(element)`.
///
/// This is the aliased form of [`simd_transform`]: input and output are the
/// same buffer, which is sound because every element only depends on itself.
#[inline(always)]
pub fn simd_transform_in_place<T, Op>(data: &mut [T], op: Op)
where
    T: SimdElement,
    Op: UnaryOp<T>,
{
    let regions = Regions::of(data);
    let (head, body, tail) = regions.split_mut(data);

    for value in head.iter_mut() {
        *value = op.scalar(*value);
    }

    for chunk in body.chunks_exact_mut(lanes::<T>()) {
        // SAFETY: body chunks start on a pack boundary and hold LANES values
        unsafe {
            let pack = T::Pack::load_aligned(chunk.as_ptr());
            op.vector(pack).store_aligned(chunk.as_mut_ptr());
        }
    }

    for value in tail.iter_mut() {
        *value = op.scalar(*value);
    }
}

/// Validating form of [`simd_transform`].
///
/// # Errors
///
/// Returns [`FoldError::OutputTooSmall`](crate::error::FoldError::OutputTooSmall)
/// when `out` is shorter than `input`.
pub fn try_simd_transform<T, Op>(input: &[T], out: &mut [T], op: Op) -> Result<usize>
where
    T: SimdElement,
    Op: UnaryOp<T>,
{
    if out.len() < input.len() {
        return Err(output_too_small(input.len(), out.len()));
    }

    Ok(simd_transform(input, out, op))
}

/// Validating form of [`simd_transform2`].
///
/// # Errors
///
/// Returns [`FoldError::LengthMismatch`](crate::error::FoldError::LengthMismatch)
/// when the inputs differ in length and
/// [`FoldError::OutputTooSmall`](crate::error::FoldError::OutputTooSmall) when
/// `out` is shorter than them.
pub fn try_simd_transform2<T, Op>(a: &[T], b: &[T], out: &mut [T], op: Op) -> Result<usize>
where
    T: SimdElement,
    Op: BinaryOp<T>,
{
    if a.len() != b.len() {
        return Err(length_mismatch(a.len(), b.len()));
    }

    if out.len() < a.len() {
        return Err(output_too_small(a.len(), out.len()));
    }

    Ok(simd_transform2(a, b, out, op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FoldError;
    use crate::traverse::{Offset, Plus, Scale, Times};

    #[test]
    fn test_transform_writes_every_index_once() {
        let n = lanes::<i32>();

        for len in 0..=(4 * n + 3) {
            for start in 0..n {
                let input: Vec<i32> = (0..(start + len) as i32).collect();
                let mut out = vec![-1i32; len];

                let written = simd_transform(&input[start..], &mut out, Offset(1000));
                assert_eq!(written, len);

                for (i, &y) in out.iter().enumerate() {
                    assert_eq!(y, (start + i) as i32 + 1000, "len {len} start {start} index {i}");
                }
            }
        }
    }

    #[test]
    fn test_transform_leaves_extra_output_untouched() {
        let input = [1.0f64, 2.0, 3.0];
        let mut out = [0.0f64; 5];

        simd_transform(&input, &mut out, Scale(2.0));
        assert_eq!(out, [2.0, 4.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_binary_transform_addition() {
        let a = [1i32, 2, 3];
        let b = [10i32, 20, 30];
        let mut out = [0i32; 3];

        simd_transform2(&a, &b, &mut out, Plus);
        assert_eq!(out, [11, 22, 33]);
    }

    #[test]
    fn test_binary_transform_misaligned_second_input() {
        let n = lanes::<f32>();
        let len = 5 * n + 1;
        let a: Vec<f32> = (0..len).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..len + 1).map(|i| (i * 3) as f32).collect();
        let mut out = vec![0.0f32; len + 2];

        simd_transform2(&a, &b[1..], &mut out[2..], Times);

        for i in 0..len {
            assert_eq!(out[i + 2], a[i] * b[i + 1]);
        }
    }

    #[test]
    #[should_panic(expected = "Vectors must be the same length")]
    fn test_binary_transform_length_mismatch_panics() {
        let mut out = [0i32; 3];
        simd_transform2(&[1, 2, 3], &[1, 2], &mut out, Plus);
    }

    #[test]
    #[should_panic(expected = "Output must hold at least 3 elements")]
    fn test_transform_short_output_panics() {
        let mut out = [0i32; 2];
        simd_transform(&[1, 2, 3], &mut out, Offset(1));
    }

    #[test]
    fn test_in_place_matches_out_of_place() {
        let data: Vec<f32> = (0..97).map(|i| i as f32 * 0.5).collect();

        let mut expected = vec![0.0f32; 96];
        simd_transform(&data[1..], &mut expected, Scale(3.0));

        let mut in_place = data[1..].to_vec();
        simd_transform_in_place(&mut in_place, Scale(3.0));

        assert_eq!(in_place, expected);
    }

    #[test]
    fn test_try_variants_report_errors() {
        let mut short = [0u8; 1];

        match try_simd_transform(&[1u8, 2], &mut short, Offset(1)) {
            Err(FoldError::OutputTooSmall { required, actual }) => {
                assert_eq!((required, actual), (2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        match try_simd_transform2(&[1u8, 2], &[1u8], &mut short, Plus) {
            Err(FoldError::LengthMismatch { left, right }) => assert_eq!((left, right), (2, 1)),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut out = [0u8; 2];
        assert_eq!(try_simd_transform2(&[1u8, 2], &[3u8, 4], &mut out, Plus).unwrap(), 2);
        assert_eq!(out, [4, 6]);
    }
}
