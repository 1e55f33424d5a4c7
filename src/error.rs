use thiserror::Error;

use crate::recorder::RecorderState;

/// Unified error type for `solverbench` operations.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Raised when a recorder operation is called outside its lifecycle window.
    #[error("`{operation}` is not allowed while the recorder is {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Recorder state at the time of the call.
        state: RecorderState,
    },

    /// Raised when diagnostic vectors have inconsistent lengths.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The dimension fixed by earlier input.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when a solver run is configured with an unusable parameter.
    #[error("invalid value for `{parameter}`: {value}")]
    InvalidParameter {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// The value that was supplied.
        value: f64,
    },
}

impl BenchError {
    /// Helper to format a [`DimensionMismatch`](BenchError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper to reject an operation issued in the wrong recorder state.
    pub fn invalid_state(operation: &'static str, state: RecorderState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Helper for builder validation failures.
    pub fn invalid_parameter(parameter: &'static str, value: f64) -> Self {
        Self::InvalidParameter { parameter, value }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, BenchError>;
