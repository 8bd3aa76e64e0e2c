//! Grand potential `Ω(φ) = f(φ) - μ·φ` and its local minimization.

use crate::error::{SolverResult, check_len};
use crate::nelder_mead::{NelderMeadConfig, nelder_mead};
use cx_energy::FreeEnergy;
use nalgebra::DVector;

/// Grand potential of a free-energy model at a fixed chemical potential.
pub struct GrandPotential<'a> {
    energy: &'a dyn FreeEnergy,
    mu: &'a DVector<f64>,
}

impl<'a> GrandPotential<'a> {
    pub fn new(energy: &'a dyn FreeEnergy, mu: &'a DVector<f64>) -> Self {
        Self { energy, mu }
    }

    /// `+inf` as soon as any component is negative; otherwise `f(φ) - μ·φ`.
    pub fn eval(&self, phi: &DVector<f64>) -> f64 {
        if phi.iter().any(|&x| x < 0.0) {
            return f64::INFINITY;
        }
        self.energy.free_energy(phi.as_slice()) - self.mu.dot(phi)
    }
}

/// Local minimum of the grand potential near a guess.
#[derive(Debug, Clone)]
pub struct LocalMinimum {
    pub phi: DVector<f64>,
    pub omega: f64,
    /// Whether the inner minimizer met its tolerances
    pub converged: bool,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Minimize `Ω` from `phi_guess` at chemical potential `mu`.
pub fn minimize_grand_potential(
    energy: &dyn FreeEnergy,
    mu: &DVector<f64>,
    phi_guess: &DVector<f64>,
    config: &NelderMeadConfig,
) -> SolverResult<LocalMinimum> {
    let n = energy.components();
    check_len("chemical potential", n, mu.len())?;
    check_len("phase guess", n, phi_guess.len())?;
    Ok(minimize_unchecked(energy, mu, phi_guess, config))
}

/// Same as [`minimize_grand_potential`] for callers that validated the shapes.
pub(crate) fn minimize_unchecked(
    energy: &dyn FreeEnergy,
    mu: &DVector<f64>,
    phi_guess: &DVector<f64>,
    config: &NelderMeadConfig,
) -> LocalMinimum {
    let omega = GrandPotential::new(energy, mu);
    let result = nelder_mead(phi_guess, |phi| omega.eval(phi), config);
    LocalMinimum {
        phi: result.x,
        omega: result.fx,
        converged: result.converged,
        iterations: result.iterations,
        evaluations: result.evaluations,
    }
}
