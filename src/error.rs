//! Error types for simdfold operations.
//!
//! The traversal and reduction hot paths never return errors. These types are
//! produced by the boundary-validating entry points (`try_*` functions,
//! [`Grain::fixed`](crate::config::Grain::fixed), dedicated thread pools) so a
//! host can reject bad input before any work starts.

use thiserror::Error;

/// Errors that can occur at the simdfold boundary.
#[derive(Debug, Error)]
pub enum FoldError {
    /// Two inputs of a binary operation differ in length.
    #[error("Length mismatch: left input has {left} elements, right input has {right}")]
    LengthMismatch {
        /// Length of the first input.
        left: usize,
        /// Length of the second input.
        right: usize,
    },

    /// The output buffer cannot hold the result.
    #[error("Output too small: {required} elements required, {actual} available")]
    OutputTooSmall {
        /// Number of elements the operation writes.
        required: usize,
        /// Capacity of the output buffer.
        actual: usize,
    },

    /// A grain size that cannot terminate the splitting recursion.
    #[error("Invalid grain: {message}")]
    InvalidGrain {
        /// Human-readable error message.
        message: String,
    },

    /// The dedicated worker pool could not be started.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for simdfold operations.
pub type Result<T> = std::result::Result<T, FoldError>;

/// Creates a length mismatch error.
pub fn length_mismatch(left: usize, right: usize) -> FoldError {
    FoldError::LengthMismatch { left, right }
}

/// Creates an output capacity error.
pub fn output_too_small(required: usize, actual: usize) -> FoldError {
    FoldError::OutputTooSmall { required, actual }
}

/// Creates an invalid grain error.
pub fn invalid_grain(message: impl Into<String>) -> FoldError {
    FoldError::InvalidGrain {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let error = length_mismatch(3, 4);
        let display = format!("{}", error);
        assert!(display.contains("Length mismatch"));
        assert!(display.contains("3 elements"));
        assert!(display.contains("right input has 4"));
    }

    #[test]
    fn test_output_too_small_display() {
        let error = output_too_small(10, 2);
        let display = format!("{}", error);
        assert!(display.contains("Output too small"));
        assert!(display.contains("10 elements required"));
        assert!(display.contains("2 available"));
    }

    #[test]
    fn test_invalid_grain_display() {
        let error = invalid_grain("grain must be at least 1");
        let display = format!("{}", error);
        assert!(display.contains("Invalid grain"));
        assert!(display.contains("grain must be at least 1"));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = length_mismatch(1, 2);

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
