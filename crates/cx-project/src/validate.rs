//! Problem validation logic.
//!
//! Everything the solver would reject as a contract violation is caught here first,
//! with the offending field named.

use crate::schema::{GuessDef, LATEST_VERSION, ModelDef, ProblemDef, SolverDef};
use cx_core::numeric::{Tolerances, nearly_equal};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Shape mismatch for {field}: expected {expected}, got {actual}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_problem(problem: &ProblemDef) -> Result<(), ValidationError> {
    if problem.version == 0 || problem.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: problem.version,
        });
    }

    validate_model(&problem.model)?;
    let n = problem.components();

    check_shape("target", n, problem.target.len())?;
    for (i, &t) in problem.target.iter().enumerate() {
        if !t.is_finite() || t < 0.0 {
            return Err(invalid(format!("target[{i}]"), t, "must be a finite non-negative fraction"));
        }
    }
    let total: f64 = problem.target.iter().sum();
    if total >= 1.0 {
        return Err(invalid("target", total, "explicit fractions must leave room for the solvent"));
    }

    validate_guess(&problem.guess, n)?;
    validate_solver(&problem.solver)
}

fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    match model {
        ModelDef::RegularSolution { chi, sizes } => {
            let species = chi.len();
            if species < 2 {
                return Err(ValidationError::ShapeMismatch {
                    field: "model.chi".to_string(),
                    expected: 2,
                    actual: species,
                });
            }
            for (i, row) in chi.iter().enumerate() {
                check_shape(&format!("model.chi[{i}]"), species, row.len())?;
                for (j, &value) in row.iter().enumerate() {
                    if !value.is_finite() {
                        return Err(invalid(format!("model.chi[{i}][{j}]"), value, "must be finite"));
                    }
                }
            }
            let tol = Tolerances::default();
            for i in 0..species {
                for j in (i + 1)..species {
                    if !nearly_equal(chi[i][j], chi[j][i], tol) {
                        return Err(invalid(
                            format!("model.chi[{i}][{j}]"),
                            chi[i][j],
                            "interaction matrix must be symmetric",
                        ));
                    }
                }
            }
            if let Some(sizes) = sizes {
                check_shape("model.sizes", species, sizes.len())?;
                for (i, &size) in sizes.iter().enumerate() {
                    if !size.is_finite() || size <= 0.0 {
                        return Err(invalid(format!("model.sizes[{i}]"), size, "must be positive"));
                    }
                }
            }
            Ok(())
        }
    }
}

fn validate_guess(guess: &GuessDef, n: usize) -> Result<(), ValidationError> {
    if guess.phases.is_empty() {
        return Err(ValidationError::ShapeMismatch {
            field: "guess.phases".to_string(),
            expected: 1,
            actual: 0,
        });
    }
    for (k, phase) in guess.phases.iter().enumerate() {
        check_shape(&format!("guess.phases[{k}]"), n, phase.len())?;
        check_finite(&format!("guess.phases[{k}]"), phase)?;
    }
    check_shape("guess.chemical_potential", n, guess.chemical_potential.len())?;
    check_finite("guess.chemical_potential", &guess.chemical_potential)?;
    check_shape(
        "guess.volume_fractions",
        guess.phases.len() - 1,
        guess.volume_fractions.len(),
    )?;
    check_finite("guess.volume_fractions", &guess.volume_fractions)
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    if !solver.tolerance.is_finite() || solver.tolerance <= 0.0 {
        return Err(invalid("solver.tolerance", solver.tolerance, "must be positive"));
    }
    if !solver.merge_tolerance.is_finite() || solver.merge_tolerance < 0.0 {
        return Err(invalid(
            "solver.merge_tolerance",
            solver.merge_tolerance,
            "must be non-negative",
        ));
    }
    if solver.max_inner_iterations == Some(0) {
        return Err(invalid("solver.max_inner_iterations", 0, "must be at least 1"));
    }
    Ok(())
}

fn check_shape(field: &str, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::ShapeMismatch {
            field: field.to_string(),
            expected,
            actual,
        })
    }
}

fn check_finite(field: &str, values: &[f64]) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(invalid(format!("{field}[{i}]"), values[i], "must be finite")),
        None => Ok(()),
    }
}

fn invalid(
    field: impl Into<String>,
    value: impl ToString,
    reason: &str,
) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
