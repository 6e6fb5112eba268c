//! # simdfold
//!
//! Alignment-aware SIMD traversal of flat numeric buffers, plus a splittable
//! fork-join reducer that spreads those traversals over worker threads.
//!
//! - [`traverse`]: single-threaded primitives (`simd_for_each`,
//!   `simd_transform`, `simd_map_reduce`, ...) that walk a buffer as an
//!   unaligned head, an aligned body of whole packs and an unaligned tail.
//! - [`parallel`]: [`parallel::parallel_reduce`] and friends, which split a
//!   range recursively down to a grain and join partial accumulators back in
//!   left-to-right order.
//! - [`simd`]: the pack abstraction the traversal engine is written against.
//!
//! ```no_run
//! use simdfold::parallel::parallel_sum;
//! use simdfold::traverse::{simd_transform2, Plus};
//!
//! let mut out = [0i32; 3];
//! simd_transform2(&[1, 2, 3], &[10, 20, 30], &mut out, Plus);
//! assert_eq!(out, [11, 22, 33]);
//!
//! assert_eq!(parallel_sum(&[1.0f64, 2.0, 3.0, 4.0, 5.0]), 15.0);
//! ```

pub mod config;
pub mod error;
pub mod parallel;
pub mod simd;
pub mod traverse;

pub use config::Grain;
pub use error::{FoldError, Result};

/// Leaf size used by [`Grain::default`].
pub const DEFAULT_GRAIN: usize = 16_384;

/// Lower bound for [`Grain::Auto`], so tiny inputs are not split into leaves
/// smaller than a few cache lines of packs.
pub const MIN_AUTO_GRAIN: usize = 1_024;

/// Leaves per worker targeted by [`Grain::Auto`].
pub const TASKS_PER_THREAD: usize = 4;
