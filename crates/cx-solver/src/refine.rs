//! Two-round workflow: over-specified solve, merge, re-solve.
//!
//! The first round runs with more candidate phases than the mixture supports;
//! duplicates converge onto each other and are merged. The second round starts from
//! the merged phases, the first-round chemical potential and the summed volume
//! fractions, with the Levenberg–Marquardt retry enabled.

use crate::coexist::{CoexistenceConfig, CoexistenceSolution, coex_exact};
use crate::error::SolverResult;
use crate::merge::{DEFAULT_MERGE_TOLERANCE, MergedPhases, merge_phases};
use crate::problem::CoexistenceGuess;
use cx_energy::FreeEnergy;
use nalgebra::DVector;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RefineConfig {
    /// Settings of the first round; the second round forces `retry_on_failure`
    pub coexistence: CoexistenceConfig,
    pub merge_tolerance: f64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            coexistence: CoexistenceConfig::default(),
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefineOutcome {
    pub first_round: CoexistenceSolution,
    pub merged: MergedPhases,
    pub second_round: CoexistenceSolution,
}

impl RefineOutcome {
    /// The final answer.
    pub fn solution(&self) -> &CoexistenceSolution {
        &self.second_round
    }
}

/// Solve, merge duplicate phases within `merge_tolerance`, and solve again.
pub fn refine(
    energy: &dyn FreeEnergy,
    guess: &CoexistenceGuess,
    target: &DVector<f64>,
    config: &RefineConfig,
) -> SolverResult<RefineOutcome> {
    info!(phases = guess.phase_count(), "first round of coexistence calculation");
    let first_round = coex_exact(energy, guess, target, &config.coexistence)?;

    let merged = merge_phases(
        &first_round.phases,
        &first_round.volume_fractions,
        config.merge_tolerance,
    )?;
    info!(
        before = first_round.phase_count(),
        after = merged.phase_count(),
        "merged coexisting phases"
    );

    let second_guess = CoexistenceGuess::new(
        merged.phases.clone(),
        first_round.chemical_potential.clone(),
        merged.volume_fractions.clone(),
    );
    let second_config = CoexistenceConfig {
        retry_on_failure: true,
        ..config.coexistence.clone()
    };
    info!(phases = merged.phase_count(), "second round of coexistence calculation");
    let second_round = coex_exact(energy, &second_guess, target, &second_config)?;

    Ok(RefineOutcome {
        first_round,
        merged,
        second_round,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_energy::RegularSolution;

    #[test]
    fn duplicate_guesses_collapse_to_two_phases() {
        let model = RegularSolution::symmetric_binary(3.0);
        let guess = CoexistenceGuess::from_rows(
            &[vec![0.1], vec![0.1], vec![0.9]],
            &[0.0],
            &[0.1, 0.3],
        );
        let target = DVector::from_element(1, 0.3);
        let config = RefineConfig {
            coexistence: CoexistenceConfig {
                verbose: false,
                ..CoexistenceConfig::default()
            },
            ..RefineConfig::default()
        };

        let outcome = refine(&model, &guess, &target, &config).unwrap();

        assert_eq!(outcome.merged.clusters, vec![vec![0, 1], vec![2]]);
        let solution = outcome.solution();
        assert_eq!(solution.phase_count(), 2);
        assert!(solution.converged, "{}", solution.message);
        let balance = solution.mass_balance_error(&target).unwrap();
        assert!(balance.amax() < 1e-6);
    }
}
