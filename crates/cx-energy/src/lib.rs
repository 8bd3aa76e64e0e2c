//! cx-energy: free-energy models for multi-component mixtures.
//!
//! Provides:
//! - `FreeEnergy` trait: the scalar oracle the coexistence solver minimizes against
//! - Composition handling with an implicit solvent component
//! - Regular-solution / Flory–Huggins model with an explicit interaction matrix
//!
//! # Architecture
//!
//! The solver only ever sees the N explicit component fractions. Models that need the
//! full (N+1)-vector expand it through [`Composition`], which appends the solvent
//! fraction `1 - sum(explicit)`. Points outside the composition simplex evaluate to
//! `+inf`; that value is the only constraint mechanism the minimizer relies on.
//!
//! # Example
//!
//! ```
//! use cx_energy::{FreeEnergy, RegularSolution};
//!
//! let model = RegularSolution::symmetric_binary(1.5);
//! assert!(model.free_energy(&[0.5]).is_finite());
//! assert!(model.free_energy(&[1.2]).is_infinite());
//! ```

pub mod composition;
pub mod error;
pub mod model;
pub mod regular_solution;

// Re-exports for ergonomics
pub use composition::{Composition, DEFAULT_FEASIBILITY_SLACK};
pub use error::{EnergyError, EnergyResult};
pub use model::{FnFreeEnergy, FreeEnergy};
pub use regular_solution::RegularSolution;
