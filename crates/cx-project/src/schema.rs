//! Problem and report schema definitions.

use serde::{Deserialize, Serialize};

/// Newest problem file version this crate reads.
pub const LATEST_VERSION: u32 = 1;

/// One coexistence problem: model, target composition, initial guesses, solver settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProblemDef {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: ModelDef,
    /// Overall composition, N explicit components
    pub target: Vec<f64>,
    pub guess: GuessDef,
    #[serde(default)]
    pub solver: SolverDef,
}

impl ProblemDef {
    /// Explicit components N implied by the model.
    pub fn components(&self) -> usize {
        self.model.components()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ModelDef {
    /// Regular solution / Flory–Huggins mixture with an implicit solvent as last species.
    RegularSolution {
        /// (N + 1) x (N + 1) symmetric interaction matrix, rows in component order
        chi: Vec<Vec<f64>>,
        /// Molecular sizes of all N + 1 species (default 1)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sizes: Option<Vec<f64>>,
    },
}

impl ModelDef {
    pub fn components(&self) -> usize {
        match self {
            ModelDef::RegularSolution { chi, .. } => chi.len().saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuessDef {
    /// m phase compositions; the first one is the reference phase
    pub phases: Vec<Vec<f64>>,
    pub chemical_potential: Vec<f64>,
    /// Volume fractions of phases 2..m
    #[serde(default)]
    pub volume_fractions: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub tolerance: f64,
    pub retry_on_failure: bool,
    /// Merge duplicate phases and solve a second round
    pub refine: bool,
    pub merge_tolerance: f64,
    pub parallel: bool,
    pub verbose: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inner_iterations: Option<usize>,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            tolerance: 1e-16,
            retry_on_failure: false,
            refine: true,
            merge_tolerance: 1e-6,
            parallel: false,
            verbose: true,
            max_inner_iterations: None,
        }
    }
}

/// Written by `cx solve --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionReport {
    pub name: String,
    pub target: Vec<f64>,
    /// Every solver round in order; the last one is the answer
    pub rounds: Vec<RoundReport>,
    /// Original phase indices merged into each phase between rounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_clusters: Option<Vec<Vec<usize>>>,
}

impl SolutionReport {
    pub fn final_round(&self) -> Option<&RoundReport> {
        self.rounds.last()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundReport {
    pub converged: bool,
    pub message: String,
    /// "hybr" or "lm"
    pub method: String,
    pub retried: bool,
    pub phases: Vec<Vec<f64>>,
    pub chemical_potential: Vec<f64>,
    /// All m volume fractions, phase 1 first
    pub volume_fractions: Vec<f64>,
    pub grand_potentials: Vec<f64>,
    pub mass_balance_error: Vec<f64>,
    pub residual_norm: f64,
    pub evaluations: usize,
    pub inner_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_section_defaults_when_missing() {
        let yaml = r#"
version: 1
name: binary
model:
  type: RegularSolution
  chi: [[0.0, 3.0], [3.0, 0.0]]
target: [0.3]
guess:
  phases: [[0.1], [0.9]]
  chemical_potential: [0.0]
  volume_fractions: [0.3]
"#;
        let problem: ProblemDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(problem.solver, SolverDef::default());
        assert_eq!(problem.components(), 1);
        assert!(matches!(problem.model, ModelDef::RegularSolution { sizes: None, .. }));
    }

    #[test]
    fn partial_solver_section_keeps_other_defaults() {
        let yaml = r#"
version: 1
name: binary
model: { type: RegularSolution, chi: [[0.0, 3.0], [3.0, 0.0]], sizes: [1.0, 2.0] }
target: [0.3]
guess: { phases: [[0.1]], chemical_potential: [0.0] }
solver: { retry_on_failure: true, parallel: true }
"#;
        let problem: ProblemDef = serde_yaml::from_str(yaml).unwrap();
        assert!(problem.solver.retry_on_failure);
        assert!(problem.solver.parallel);
        assert!(problem.solver.refine);
        assert_eq!(problem.solver.tolerance, 1e-16);
        assert!(problem.guess.volume_fractions.is_empty());
    }
}
