//! Phase-coexistence solver for multi-component mixtures.
//!
//! For a target overall composition this crate finds m phase compositions, a shared
//! chemical potential and the phase volume fractions such that every phase is a local
//! minimum of the grand potential `Ω(φ) = f(φ) - μ·φ`, all phases share the same `Ω`,
//! and the volume-weighted phases reproduce the target.
//!
//! The procedure is nested: an inner `argmin` Nelder–Mead minimization per phase
//! ([`grand_potential`]) inside an outer `gomez` trust-region root finder
//! ([`hybrid`], with a one-shot [`levenberg_marquardt`] retry) over the unknowns
//! `μ ‖ volume fractions`. [`merge`] collapses near-duplicate phases so an
//! over-specified solve can be re-run with fewer phases ([`refine`]).

pub mod coexist;
pub mod error;
pub mod grand_potential;
pub mod hybrid;
pub mod jacobian;
pub mod levenberg_marquardt;
pub mod merge;
pub mod nelder_mead;
pub mod problem;
pub mod refine;
pub mod residual;
pub mod root;

pub use coexist::{
    CoexistenceConfig, CoexistenceSolution, OUTER_DIFFERENCE_STEP, OUTER_TOLERANCE,
    coex_exact,
};
pub use error::{SolverError, SolverResult};
pub use grand_potential::{GrandPotential, LocalMinimum, minimize_grand_potential};
pub use hybrid::{HybridConfig, hybrid_solve};
pub use levenberg_marquardt::{LevenbergMarquardtConfig, levenberg_marquardt_solve};
pub use merge::{DEFAULT_MERGE_TOLERANCE, MergedPhases, merge_phases};
pub use nelder_mead::{NelderMeadConfig, NelderMeadResult, nelder_mead};
pub use problem::CoexistenceGuess;
pub use refine::{RefineConfig, RefineOutcome, refine};
pub use residual::{CoexistenceResidual, mass_balance};
pub use root::{RootMethod, RootResult};
