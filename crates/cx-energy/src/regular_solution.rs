//! Regular-solution (Flory–Huggins) free energy with an implicit solvent.
//!
//! ```text
//! f(φ) = ½ Σ_ij φ_i χ_ij φ_j + Σ_{φ_i > 0} (φ_i / L_i) ln φ_i
//! ```
//!
//! over the full (N+1)-vector, solvent last. `L_i` are molecular sizes (all 1 for a
//! plain regular solution).

use crate::composition::{Composition, DEFAULT_FEASIBILITY_SLACK};
use crate::error::{EnergyError, EnergyResult};
use crate::model::FreeEnergy;
use cx_core::numeric::{Tolerances, nearly_equal};
use nalgebra::DMatrix;

/// Immutable regular-solution model.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularSolution {
    /// (N+1)×(N+1) symmetric interaction matrix, solvent in the last row/column.
    chi: DMatrix<f64>,
    /// Molecular sizes, one per expanded component.
    sizes: Vec<f64>,
}

impl RegularSolution {
    /// Create a model from a symmetric (N+1)×(N+1) interaction matrix.
    pub fn new(chi: DMatrix<f64>) -> EnergyResult<Self> {
        if !chi.is_square() {
            return Err(EnergyError::DimensionMismatch {
                what: "interaction matrix columns",
                expected: chi.nrows(),
                actual: chi.ncols(),
            });
        }
        if chi.nrows() < 2 {
            return Err(EnergyError::InvalidArg {
                what: "interaction matrix needs at least one explicit component and the solvent",
            });
        }
        if chi.iter().any(|v| !v.is_finite()) {
            return Err(EnergyError::NonPhysical {
                what: "non-finite interaction parameter",
            });
        }
        let tol = Tolerances::default();
        for i in 0..chi.nrows() {
            for j in (i + 1)..chi.ncols() {
                if !nearly_equal(chi[(i, j)], chi[(j, i)], tol) {
                    return Err(EnergyError::NonPhysical {
                        what: "interaction matrix must be symmetric",
                    });
                }
            }
        }

        let sizes = vec![1.0; chi.nrows()];
        Ok(Self { chi, sizes })
    }

    /// Build from row-major nested vectors (as read from problem files).
    pub fn from_rows(rows: &[Vec<f64>]) -> EnergyResult<Self> {
        let n = rows.len();
        for row in rows {
            if row.len() != n {
                return Err(EnergyError::DimensionMismatch {
                    what: "interaction matrix row",
                    expected: n,
                    actual: row.len(),
                });
            }
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(DMatrix::from_row_slice(n, n, &flat))
    }

    /// Set molecular sizes `L_i` (one per expanded component, solvent last).
    pub fn with_sizes(mut self, sizes: Vec<f64>) -> EnergyResult<Self> {
        if sizes.len() != self.chi.nrows() {
            return Err(EnergyError::DimensionMismatch {
                what: "molecular sizes",
                expected: self.chi.nrows(),
                actual: sizes.len(),
            });
        }
        if sizes.iter().any(|l| !l.is_finite() || *l <= 0.0) {
            return Err(EnergyError::NonPhysical {
                what: "molecular sizes must be positive and finite",
            });
        }
        self.sizes = sizes;
        Ok(self)
    }

    /// Symmetric binary mixture (one explicit component plus solvent).
    ///
    /// Critical point at φ = 0.5, χ = 2.
    pub fn symmetric_binary(chi: f64) -> Self {
        Self {
            chi: DMatrix::from_row_slice(2, 2, &[0.0, chi, chi, 0.0]),
            sizes: vec![1.0; 2],
        }
    }

    /// Three explicit components (N1, N2, B) plus solvent, binding energies
    /// N-N: -1.5, N-B: -0.5, B-B: -0.5 (in kT), Li & Jacobs (2024).
    pub fn li_jacobs_2024() -> Self {
        #[rustfmt::skip]
        let chi = DMatrix::from_row_slice(4, 4, &[
            0.0, 9.0, 3.0, 4.5,
            9.0, 0.0, 3.0, 4.5,
            3.0, 3.0, 0.0, 1.5,
            4.5, 4.5, 1.5, 0.0,
        ]);
        Self {
            chi,
            sizes: vec![1.0; 4],
        }
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    /// Exchange chemical potential `∂f/∂φ_i - ∂f/∂φ_solvent` for each explicit component.
    ///
    /// Only defined strictly inside the simplex.
    pub fn exchange_chemical_potential(&self, phi: &[f64]) -> EnergyResult<Vec<f64>> {
        let n = self.components();
        if phi.len() != n {
            return Err(EnergyError::DimensionMismatch {
                what: "composition",
                expected: n,
                actual: phi.len(),
            });
        }
        let comp = Composition::from_explicit(phi);
        if !comp.iter().all(|x| x > 0.0) {
            return Err(EnergyError::NonPhysical {
                what: "chemical potential needs a composition strictly inside the simplex",
            });
        }

        let full = comp.to_vec();
        let partial: Vec<f64> = (0..=n)
            .map(|i| {
                let interaction: f64 = (0..=n).map(|j| self.chi[(i, j)] * full[j]).sum();
                interaction + (full[i].ln() + 1.0) / self.sizes[i]
            })
            .collect();
        Ok((0..n).map(|i| partial[i] - partial[n]).collect())
    }
}

impl FreeEnergy for RegularSolution {
    fn name(&self) -> &str {
        "regular-solution"
    }

    fn components(&self) -> usize {
        self.chi.nrows() - 1
    }

    fn free_energy(&self, phi: &[f64]) -> f64 {
        if phi.len() != self.components() {
            return f64::INFINITY;
        }
        let comp = Composition::from_explicit(phi);
        if !comp.is_feasible(DEFAULT_FEASIBILITY_SLACK) {
            return f64::INFINITY;
        }

        let mut f = 0.0;
        for (i, xi) in comp.iter().enumerate() {
            let interaction: f64 = comp
                .iter()
                .enumerate()
                .map(|(j, xj)| self.chi[(i, j)] * xj)
                .sum();
            f += 0.5 * xi * interaction;
            if xi > 0.0 {
                f += xi * xi.ln() / self.sizes[i];
            }
        }
        f
    }
}
