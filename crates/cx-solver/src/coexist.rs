//! High-level coexistence solver interface.

use crate::error::{SolverError, SolverResult};
use crate::hybrid::{HybridConfig, hybrid_solve};
use crate::levenberg_marquardt::{LevenbergMarquardtConfig, levenberg_marquardt_solve};
use crate::nelder_mead::NelderMeadConfig;
use crate::problem::CoexistenceGuess;
use crate::residual::{CoexistenceResidual, mass_balance};
use crate::root::{RootMethod, RootResult};
use cx_core::numeric::ensure_positive;
use cx_energy::FreeEnergy;
use nalgebra::DVector;
use tracing::{debug, info, warn};

/// Forward-difference step of the outer Jacobian.
///
/// Wider than machine precision: inner minima are only resolved to about 1e-8, and
/// a step of that size would difference noise.
pub const OUTER_DIFFERENCE_STEP: f64 = 1e-6;

/// Outer residual norm accepted as a root by the trust-region solver.
pub const OUTER_TOLERANCE: f64 = 1e-7;

/// Coexistence solver configuration.
#[derive(Debug, Clone)]
pub struct CoexistenceConfig {
    /// Inner minimizer tolerance on the standard deviation of the simplex's grand potentials
    pub tolerance: f64,
    /// Inner minimizer iteration budget (defaults to 200 * N)
    pub max_inner_iterations: Option<usize>,
    /// Retry once with Levenberg–Marquardt when the trust-region method fails
    pub retry_on_failure: bool,
    /// Report status at `info` instead of `debug`
    pub verbose: bool,
    /// Minimize the phases of one residual evaluation in parallel
    pub parallel: bool,
    /// Primary trust-region root finder
    pub hybrid: HybridConfig,
    /// One-shot Levenberg–Marquardt fallback
    pub levenberg_marquardt: LevenbergMarquardtConfig,
}

impl Default for CoexistenceConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-16,
            max_inner_iterations: None,
            retry_on_failure: false,
            verbose: true,
            parallel: false,
            hybrid: HybridConfig {
                tolerance: OUTER_TOLERANCE,
                variable_scale: OUTER_DIFFERENCE_STEP / f64::EPSILON.sqrt(),
                ..HybridConfig::default()
            },
            levenberg_marquardt: LevenbergMarquardtConfig {
                epsfcn: OUTER_DIFFERENCE_STEP,
                ..LevenbergMarquardtConfig::default()
            },
        }
    }
}

impl CoexistenceConfig {
    pub fn validate(&self) -> SolverResult<()> {
        ensure_positive(self.tolerance, "tolerance")?;
        ensure_positive(self.hybrid.tolerance, "trust-region tolerance")?;
        ensure_positive(self.hybrid.variable_scale, "trust-region variable scale")?;
        if self.max_inner_iterations == Some(0) {
            return Err(SolverError::InvalidInput {
                what: "inner iteration budget must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn inner(&self) -> NelderMeadConfig {
        NelderMeadConfig {
            tolerance: self.tolerance,
            max_iterations: self.max_inner_iterations,
        }
    }
}

/// Result of [`coex_exact`]. Returned whether or not the root finder converged.
#[derive(Debug, Clone)]
pub struct CoexistenceSolution {
    /// m phase compositions, phase 1 first
    pub phases: Vec<DVector<f64>>,
    /// Shared chemical potential (N entries)
    pub chemical_potential: DVector<f64>,
    /// Volume fractions of phases 2..m
    pub volume_fractions: DVector<f64>,
    /// Grand potential of each phase at `chemical_potential`
    pub grand_potentials: Vec<f64>,
    pub converged: bool,
    /// Termination message of the last root-finding run
    pub message: String,
    /// Method that produced this solution
    pub method: RootMethod,
    /// Whether the Levenberg–Marquardt retry ran
    pub retried: bool,
    /// Norm of the residual at the returned point
    pub residual_norm: f64,
    /// Residual evaluations across both attempts
    pub evaluations: usize,
    /// Inner minimizations that stopped on their budget
    pub inner_failures: usize,
}

impl CoexistenceSolution {
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// All m volume fractions, phase 1 taking `1 - Σ others`.
    pub fn all_volume_fractions(&self) -> DVector<f64> {
        let m = self.phases.len();
        let first = 1.0 - self.volume_fractions.sum();
        DVector::from_iterator(
            m,
            std::iter::once(first).chain(self.volume_fractions.iter().copied()),
        )
    }

    /// Volume-weighted phases minus `target`.
    pub fn mass_balance_error(&self, target: &DVector<f64>) -> SolverResult<DVector<f64>> {
        mass_balance(&self.phases, &self.volume_fractions, target)
    }
}

/// Compute m coexisting phases for `target`, starting from `guess`.
///
/// Fails only on contract violations (shape mismatches, non-finite input,
/// invalid tolerance), before any numerical work. Non-convergence is returned as data.
///
/// The trust-region method runs first; when it fails and `retry_on_failure` is set, a single
/// Levenberg–Marquardt run restarts from the same initial point. The phases are then
/// recovered with one more diagnostic residual evaluation.
pub fn coex_exact(
    energy: &dyn FreeEnergy,
    guess: &CoexistenceGuess,
    target: &DVector<f64>,
    config: &CoexistenceConfig,
) -> SolverResult<CoexistenceSolution> {
    config.validate()?;
    let residual =
        CoexistenceResidual::new(energy, guess, target, config.inner(), config.parallel)?;

    let x0 = DVector::from_iterator(
        residual.unknowns(),
        guess
            .chemical_potential
            .iter()
            .chain(guess.volume_fractions.iter())
            .copied(),
    );

    let mut result = hybrid_solve(x0.clone(), |x| residual.evaluate(x), &config.hybrid);
    report_status(&result, config.verbose);
    let mut evaluations = result.evaluations;

    let mut retried = false;
    if config.retry_on_failure && !result.converged {
        if config.verbose {
            info!(model = energy.name(), "using LM");
        } else {
            debug!(model = energy.name(), "using LM");
        }
        result = levenberg_marquardt_solve(x0, |x| residual.evaluate(x), &config.levenberg_marquardt);
        report_status(&result, config.verbose);
        evaluations += result.evaluations;
        retried = true;
    }

    let (chemical_potential, volume_fractions) = residual.split(&result.x);
    let minima = residual.phases(&result.x);
    let final_residual = residual.assemble(&minima, &volume_fractions);
    let residual_norm = final_residual.norm();
    if config.verbose {
        info!(residual_norm = residual_norm, "--> |diff| = {residual_norm:e}");
    } else {
        debug!(residual_norm = residual_norm, "--> |diff| = {residual_norm:e}");
    }

    let inner_failures = residual.inner_failures();
    if inner_failures > 0 {
        warn!(
            inner_failures = inner_failures,
            phases = minima.len(),
            "grand-potential minimizations stopped on their iteration budget"
        );
    }

    Ok(CoexistenceSolution {
        grand_potentials: minima.iter().map(|min| min.omega).collect(),
        phases: minima.into_iter().map(|min| min.phi).collect(),
        chemical_potential,
        volume_fractions,
        converged: result.converged,
        message: result.message,
        method: result.method,
        retried,
        residual_norm,
        evaluations,
        inner_failures,
    })
}

fn report_status(result: &RootResult, verbose: bool) {
    if verbose {
        info!(
            method = %result.method,
            residual_norm = result.residual_norm,
            evaluations = result.evaluations,
            "COEX STATUS: {} {}",
            result.converged,
            result.message
        );
    } else {
        debug!(
            method = %result.method,
            residual_norm = result.residual_norm,
            evaluations = result.evaluations,
            "COEX STATUS: {} {}",
            result.converged,
            result.message
        );
    }
}
