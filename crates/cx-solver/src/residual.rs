//! Joint residual of the coexistence problem.
//!
//! Unknowns are `x = μ ‖ volf` (N + m - 1 entries). The residual is
//!
//! ```text
//! d[k-1]       = Ω_k - Ω_0                                    k = 1..m-1
//! d[m-1 .. ]   = φ_0 (1 - Σ volf) + Σ_k volf_k φ_k - target   (N entries)
//! ```
//!
//! where `φ_k`, `Ω_k` are the grand-potential minima reached from the *initial*
//! phase guesses at the current `μ`. Restarting every evaluation from the same guesses
//! keeps the identity of each phase stable across root-finder iterations.

use crate::error::{SolverResult, check_len};
use crate::grand_potential::{LocalMinimum, minimize_unchecked};
use crate::nelder_mead::NelderMeadConfig;
use crate::problem::CoexistenceGuess;
use cx_energy::FreeEnergy;
use nalgebra::DVector;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Residual of one coexistence solve: oracle, fixed guesses and target.
pub struct CoexistenceResidual<'a> {
    energy: &'a dyn FreeEnergy,
    guesses: &'a [DVector<f64>],
    target: &'a DVector<f64>,
    inner: NelderMeadConfig,
    parallel: bool,
    inner_failures: AtomicUsize,
}

impl<'a> CoexistenceResidual<'a> {
    /// Validate shapes and capture the initial phase guesses.
    pub fn new(
        energy: &'a dyn FreeEnergy,
        guess: &'a CoexistenceGuess,
        target: &'a DVector<f64>,
        inner: NelderMeadConfig,
        parallel: bool,
    ) -> SolverResult<Self> {
        guess.validate(target, energy.components())?;
        Ok(Self {
            energy,
            guesses: &guess.phases,
            target,
            inner,
            parallel,
            inner_failures: AtomicUsize::new(0),
        })
    }

    /// Number of explicit components N.
    pub fn components(&self) -> usize {
        self.target.len()
    }

    /// Number of candidate phases m.
    pub fn phase_count(&self) -> usize {
        self.guesses.len()
    }

    /// Size of the unknown and residual vectors, N + m - 1.
    pub fn unknowns(&self) -> usize {
        self.components() + self.phase_count() - 1
    }

    /// Inner minimizations that ran out of budget so far.
    pub fn inner_failures(&self) -> usize {
        self.inner_failures.load(Ordering::Relaxed)
    }

    /// Split unknowns into chemical potential and volume fractions.
    pub fn split(&self, x: &DVector<f64>) -> (DVector<f64>, DVector<f64>) {
        let n = self.components();
        let mu = DVector::from_iterator(n, x.iter().take(n).copied());
        let volf = DVector::from_iterator(x.len() - n, x.iter().skip(n).copied());
        (mu, volf)
    }

    /// Minimize the grand potential from every initial guess at `mu`.
    pub fn minimize_phases(&self, mu: &DVector<f64>) -> Vec<LocalMinimum> {
        let minimize = |guess: &DVector<f64>| minimize_unchecked(self.energy, mu, guess, &self.inner);
        let minima: Vec<LocalMinimum> = if self.parallel {
            self.guesses.par_iter().map(minimize).collect()
        } else {
            self.guesses.iter().map(minimize).collect()
        };

        for (phase, min) in minima.iter().enumerate() {
            if !min.converged {
                self.inner_failures.fetch_add(1, Ordering::Relaxed);
                debug!(
                    phase = phase + 1,
                    iterations = min.iterations,
                    evaluations = min.evaluations,
                    "grand-potential minimization did not converge"
                );
            }
        }
        minima
    }

    /// Residual vector at `x` (N + m - 1 entries).
    pub fn evaluate(&self, x: &DVector<f64>) -> DVector<f64> {
        let (mu, volf) = self.split(x);
        let minima = self.minimize_phases(&mu);
        self.assemble(&minima, &volf)
    }

    /// Diagnostic mode: the m minimized phases at `x`, phase 1 first.
    pub fn phases(&self, x: &DVector<f64>) -> Vec<LocalMinimum> {
        let (mu, _) = self.split(x);
        self.minimize_phases(&mu)
    }

    /// Residual from already minimized phases.
    pub fn assemble(&self, minima: &[LocalMinimum], volf: &DVector<f64>) -> DVector<f64> {
        let m = minima.len();
        let mut d = DVector::zeros(self.components() + m - 1);
        let omega0 = minima[0].omega;
        for k in 1..m {
            d[k - 1] = minima[k].omega - omega0;
        }

        let phases: Vec<DVector<f64>> = minima.iter().map(|min| min.phi.clone()).collect();
        let balance = mass_balance_unchecked(&phases, volf, self.target);
        d.rows_mut(m - 1, self.components()).copy_from(&balance);
        d
    }
}

/// Mass-balance error `φ_0 (1 - Σ volf) + Σ_k volf_k φ_{k+1} - target`.
pub fn mass_balance(
    phases: &[DVector<f64>],
    volume_fractions: &DVector<f64>,
    target: &DVector<f64>,
) -> SolverResult<DVector<f64>> {
    if phases.is_empty() {
        return Err(crate::error::SolverError::InvalidInput {
            what: "mass balance needs at least one phase".to_string(),
        });
    }
    check_len("volume fractions", phases.len() - 1, volume_fractions.len())?;
    for phase in phases {
        check_len("phase", target.len(), phase.len())?;
    }
    Ok(mass_balance_unchecked(phases, volume_fractions, target))
}

fn mass_balance_unchecked(
    phases: &[DVector<f64>],
    volume_fractions: &DVector<f64>,
    target: &DVector<f64>,
) -> DVector<f64> {
    let reference = 1.0 - volume_fractions.sum();
    let mut total = &phases[0] * reference;
    for (phase, &v) in phases[1..].iter().zip(volume_fractions.iter()) {
        total += phase * v;
    }
    total - target
}
