//! Initial guesses of a coexistence solve and their shape validation.

use crate::error::{SolverError, SolverResult, check_len};
use cx_core::numeric::ensure_all_finite;
use nalgebra::DVector;

/// Starting point of a coexistence solve.
///
/// Phase order matters: phase 1 (`phases[0]`) is the reference phase, and
/// `volume_fractions[k]` belongs to `phases[k + 1]`; phase 1 takes the complement.
#[derive(Debug, Clone, PartialEq)]
pub struct CoexistenceGuess {
    /// m phase compositions, N explicit components each
    pub phases: Vec<DVector<f64>>,
    /// N chemical potentials
    pub chemical_potential: DVector<f64>,
    /// m - 1 volume fractions of phases 2..m
    pub volume_fractions: DVector<f64>,
}

impl CoexistenceGuess {
    pub fn new(
        phases: Vec<DVector<f64>>,
        chemical_potential: DVector<f64>,
        volume_fractions: DVector<f64>,
    ) -> Self {
        Self {
            phases,
            chemical_potential,
            volume_fractions,
        }
    }

    /// Build from plain rows (as read from problem files).
    pub fn from_rows(phases: &[Vec<f64>], chemical_potential: &[f64], volume_fractions: &[f64]) -> Self {
        Self {
            phases: phases.iter().map(|p| DVector::from_column_slice(p)).collect(),
            chemical_potential: DVector::from_column_slice(chemical_potential),
            volume_fractions: DVector::from_column_slice(volume_fractions),
        }
    }

    /// Number of candidate phases m.
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Check every shape against `components` explicit components and the target.
    pub fn validate(&self, target: &DVector<f64>, components: usize) -> SolverResult<()> {
        if components == 0 {
            return Err(SolverError::InvalidInput {
                what: "free-energy model has no explicit components".to_string(),
            });
        }
        if self.phases.is_empty() {
            return Err(SolverError::InvalidInput {
                what: "at least one phase guess is required".to_string(),
            });
        }
        check_len("target composition", components, target.len())?;
        check_len("chemical potential guess", components, self.chemical_potential.len())?;
        for phase in &self.phases {
            check_len("phase guess", components, phase.len())?;
            ensure_all_finite(phase.as_slice(), "phase guess")?;
        }
        check_len(
            "volume fraction guess",
            self.phases.len() - 1,
            self.volume_fractions.len(),
        )?;
        ensure_all_finite(target.as_slice(), "target composition")?;
        ensure_all_finite(self.chemical_potential.as_slice(), "chemical potential guess")?;
        ensure_all_finite(self.volume_fractions.as_slice(), "volume fraction guess")?;
        Ok(())
    }
}
