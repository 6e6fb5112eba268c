//! Leaf-size configuration for the splittable reducer.

use std::num::NonZeroUsize;

use crate::error::{invalid_grain, Result};
use crate::{DEFAULT_GRAIN, MIN_AUTO_GRAIN, TASKS_PER_THREAD};

/// Grain threshold: ranges at or below it run sequentially as one leaf.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Grain {
    /// Split until ranges hold at most this many elements.
    Fixed(NonZeroUsize),
    /// Derive the grain from the range length and the worker count so that
    /// every worker receives about [`TASKS_PER_THREAD`] leaves.
    Auto,
}

impl Grain {
    /// A fixed grain of `n` elements.
    ///
    /// # Errors
    ///
    /// Returns [`FoldError::InvalidGrain`](crate::error::FoldError::InvalidGrain)
    /// for `n == 0`, which would split forever.
    pub fn fixed(n: usize) -> Result<Self> {
        NonZeroUsize::new(n)
            .map(Grain::Fixed)
            .ok_or_else(|| invalid_grain("grain must be at least 1 element"))
    }

    /// Resolves the grain for a range of `len` elements spread over `threads` workers.
    ///
    /// The result is always at least 1.
    pub fn resolve(self, len: usize, threads: usize) -> usize {
        match self {
            Grain::Fixed(n) => n.get(),
            Grain::Auto => {
                let leaves = threads.max(1) * TASKS_PER_THREAD;
                len.div_ceil(leaves).max(MIN_AUTO_GRAIN)
            }
        }
    }
}

impl Default for Grain {
    fn default() -> Self {
        match NonZeroUsize::new(DEFAULT_GRAIN) {
            Some(n) => Grain::Fixed(n),
            None => Grain::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_rejects_zero() {
        assert!(Grain::fixed(0).is_err());
        assert_eq!(Grain::fixed(7).unwrap().resolve(1_000, 8), 7);
    }

    #[test]
    fn test_auto_spreads_over_threads() {
        let len = 1 << 20;
        let grain = Grain::Auto.resolve(len, 4);

        assert!(grain >= MIN_AUTO_GRAIN);
        assert!(len.div_ceil(grain) <= 4 * TASKS_PER_THREAD);
    }

    #[test]
    fn test_auto_small_ranges_use_minimum() {
        assert_eq!(Grain::Auto.resolve(0, 16), MIN_AUTO_GRAIN);
        assert_eq!(Grain::Auto.resolve(10, 0), MIN_AUTO_GRAIN);
    }

    #[test]
    fn test_default_is_fixed() {
        assert_eq!(Grain::default().resolve(usize::MAX, 1), DEFAULT_GRAIN);
    }
}
