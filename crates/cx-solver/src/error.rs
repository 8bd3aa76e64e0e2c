//! Error types for solver operations.

use cx_core::error::CxError;
use thiserror::Error;

/// Contract violations detected before any numerical work starts.
///
/// Non-convergence is not an error: it is reported through
/// [`CoexistenceSolution::converged`](crate::CoexistenceSolution).
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] CxError),
}

pub type SolverResult<T> = Result<T, SolverError>;

/// Fail with [`SolverError::DimensionMismatch`] unless `actual == expected`.
pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> SolverResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SolverError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
