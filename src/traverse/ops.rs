//! Ready-made element-wise operations and mappers.

use crate::simd::{lane_max, lane_min, SimdElement, SimdPack};
use crate::traverse::{BinaryOp, MapReducer, UnaryOp};

macro_rules! impl_binary_op {
    ($(#[$doc:meta])* $name:ident, |$a:ident, $b:ident| $scalar:expr, $vector:expr) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default)]
        pub struct $name;

        impl<T: SimdElement> BinaryOp<T> for $name {
            #[inline(always)]
            fn scalar(&self, $a: T, $b: T) -> T {
                $scalar
            }

            #[inline(always)]
            fn vector(&self, $a: T::Pack, $b: T::Pack) -> T::Pack {
                $vector
            }
        }
    };
}

impl_binary_op!(
    /// `a + b`
    Plus, |a, b| a + b, a + b
);
impl_binary_op!(
    /// `a - b`
    Minus, |a, b| a - b, a - b
);
impl_binary_op!(
    /// `a * b`
    Times, |a, b| a * b, a * b
);
impl_binary_op!(
    /// `a / b`
    Divide, |a, b| a / b, a / b
);
impl_binary_op!(
    /// Minimum; NaN operands are skipped, see [`lane_min`].
    Min, |a, b| lane_min(a, b), a.simd_min(b)
);
impl_binary_op!(
    /// Maximum; NaN operands are skipped, see [`lane_max`].
    Max, |a, b| lane_max(a, b), a.simd_max(b)
);

/// Multiplies every element by a constant.
#[derive(Copy, Clone, Debug)]
pub struct Scale<T>(pub T);

impl<T: SimdElement> UnaryOp<T> for Scale<T> {
    #[inline(always)]
    fn scalar(&self, x: T) -> T {
        x * self.0
    }

    #[inline(always)]
    fn vector(&self, x: T::Pack) -> T::Pack {
        x * T::Pack::splat(self.0)
    }
}

/// Adds a constant to every element.
#[derive(Copy, Clone, Debug)]
pub struct Offset<T>(pub T);

impl<T: SimdElement> UnaryOp<T> for Offset<T> {
    #[inline(always)]
    fn scalar(&self, x: T) -> T {
        x + self.0
    }

    #[inline(always)]
    fn vector(&self, x: T::Pack) -> T::Pack {
        x + T::Pack::splat(self.0)
    }
}

/// Sum of all elements.
#[derive(Copy, Clone, Debug, Default)]
pub struct SumMapper;

impl<T: SimdElement> MapReducer<T, T> for SumMapper {
    #[inline(always)]
    fn map_scalar(&self, value: T, acc: &mut T) {
        *acc = *acc + value;
    }

    #[inline(always)]
    fn map_vector(&self, pack: T::Pack, acc: &mut T::Pack) {
        *acc = *acc + pack;
    }

    #[inline(always)]
    fn reduce(&self, acc: T::Pack, out: &mut T) {
        *out = *out + acc.reduce_sum();
    }
}

/// Sum of the squared elements.
#[derive(Copy, Clone, Debug, Default)]
pub struct SumOfSquares;

impl<T: SimdElement> MapReducer<T, T> for SumOfSquares {
    #[inline(always)]
    fn map_scalar(&self, value: T, acc: &mut T) {
        *acc = *acc + value * value;
    }

    #[inline(always)]
    fn map_vector(&self, pack: T::Pack, acc: &mut T::Pack) {
        *acc = *acc + pack * pack;
    }

    #[inline(always)]
    fn reduce(&self, acc: T::Pack, out: &mut T) {
        *out = *out + acc.reduce_sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::lanes;

    #[test]
    fn test_scalar_and_vector_forms_agree() {
        let n = lanes::<f64>();
        let a: Vec<f64> = (0..n).map(|i| i as f64 + 1.5).collect();
        let b: Vec<f64> = (0..n).map(|i| 4.0 - i as f64).collect();

        let pa = <f64 as SimdElement>::Pack::from_slice(&a);
        let pb = <f64 as SimdElement>::Pack::from_slice(&b);

        type P = <f64 as SimdElement>::Pack;

        fn check<Op: BinaryOp<f64>>(op: Op, a: &[f64], b: &[f64], pa: P, pb: P) {
            let mut lanes = vec![0.0; a.len()];
            op.vector(pa, pb).write_to_slice(&mut lanes);
            for i in 0..a.len() {
                assert_eq!(lanes[i], op.scalar(a[i], b[i]));
            }
        }

        check(Plus, &a, &b, pa, pb);
        check(Minus, &a, &b, pa, pb);
        check(Times, &a, &b, pa, pb);
        check(Divide, &a, &b, pa, pb);
        check(Min, &a, &b, pa, pb);
        check(Max, &a, &b, pa, pb);
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(UnaryOp::scalar(&Scale(3), 4), 12);
        assert_eq!(UnaryOp::scalar(&Offset(-2.5f32), 1.0), -1.5);
    }
}
