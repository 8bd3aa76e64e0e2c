//! Compilation of a validated `ProblemDef` into solver inputs.

use cx_energy::RegularSolution;
use cx_project::schema::{ModelDef, ProblemDef};
use cx_solver::{CoexistenceConfig, CoexistenceGuess, RefineConfig};
use nalgebra::DVector;

use crate::error::CliResult;

/// Everything needed to run one problem.
pub struct CompiledProblem {
    pub model: RegularSolution,
    pub guess: CoexistenceGuess,
    pub target: DVector<f64>,
    pub config: RefineConfig,
    pub refine: bool,
}

pub fn compile_problem(problem: &ProblemDef) -> CliResult<CompiledProblem> {
    let model = match &problem.model {
        ModelDef::RegularSolution { chi, sizes } => {
            let model = RegularSolution::from_rows(chi)?;
            match sizes {
                Some(sizes) => model.with_sizes(sizes.clone())?,
                None => model,
            }
        }
    };

    let guess = CoexistenceGuess::from_rows(
        &problem.guess.phases,
        &problem.guess.chemical_potential,
        &problem.guess.volume_fractions,
    );
    let target = DVector::from_column_slice(&problem.target);

    let solver = &problem.solver;
    let config = RefineConfig {
        coexistence: CoexistenceConfig {
            tolerance: solver.tolerance,
            max_inner_iterations: solver.max_inner_iterations,
            retry_on_failure: solver.retry_on_failure,
            verbose: solver.verbose,
            parallel: solver.parallel,
            ..CoexistenceConfig::default()
        },
        merge_tolerance: solver.merge_tolerance,
    };

    Ok(CompiledProblem {
        model,
        guess,
        target,
        config,
        refine: solver.refine,
    })
}
