//! Fork-join schedulers.
//!
//! The reducer only needs to run two closures, possibly in parallel, and wait
//! for both. [`ForkJoin`] captures that contract so the same reduction code
//! runs on rayon's global pool, on a dedicated pool, or as plain recursion.

use std::panic::{self, AssertUnwindSafe};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::Result;

pub trait ForkJoin: Sync {
    /// Runs `left` and `right`, potentially in parallel, and returns both
    /// results once both have finished. A panic in either closure is
    /// propagated after the other one completes; if both panic, the panic
    /// of `left` wins.
    fn join<A, B, RA, RB>(&self, left: A, right: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send;

    /// Runs `op` inside the scheduler's execution context.
    fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        op()
    }

    /// Number of workers tasks are spread over.
    fn num_threads(&self) -> usize;
}

/// rayon's global thread pool.
#[derive(Copy, Clone, Debug, Default)]
pub struct Rayon;

impl ForkJoin for Rayon {
    #[inline]
    fn join<A, B, RA, RB>(&self, left: A, right: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        rayon::join(left, right)
    }

    fn num_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// A dedicated rayon pool with a fixed number of workers.
#[derive(Debug)]
pub struct RayonPool {
    pool: ThreadPool,
}

impl RayonPool {
    /// Starts a pool of `threads` workers. Zero lets rayon pick the count.
    ///
    /// # Errors
    ///
    /// Returns [`FoldError::ThreadPool`](crate::error::FoldError::ThreadPool)
    /// when the workers cannot be spawned.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("simdfold-{i}"))
            .build()?;

        debug!(threads = pool.current_num_threads(), "started worker pool");

        Ok(Self { pool })
    }
}

impl ForkJoin for RayonPool {
    #[inline]
    fn join<A, B, RA, RB>(&self, left: A, right: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.join(left, right)
    }

    fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Single-threaded fallback: left, then right, on the calling thread.
///
/// `right` still runs when `left` panics, matching rayon's join.
#[derive(Copy, Clone, Debug, Default)]
pub struct Sequential;

impl ForkJoin for Sequential {
    #[inline]
    fn join<A, B, RA, RB>(&self, left: A, right: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        let a = panic::catch_unwind(AssertUnwindSafe(left));
        let b = panic::catch_unwind(AssertUnwindSafe(right));

        match (a, b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(payload), _) | (_, Err(payload)) => panic::resume_unwind(payload),
        }
    }

    fn num_threads(&self) -> usize {
        1
    }
}
