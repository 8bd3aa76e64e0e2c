//! Free-energy model errors.

use thiserror::Error;

/// Result type for free-energy model operations.
pub type EnergyResult<T> = Result<T, EnergyError>;

/// Errors raised while building or querying a free-energy model.
///
/// Evaluating the oracle itself never fails; these cover model construction and the
/// analytic helpers that require an interior composition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnergyError {
    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Non-physical values (non-symmetric interaction, non-positive size, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Vector or matrix of the wrong size.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
