//! CLI error type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Problem error: {0}")]
    Project(#[from] cx_project::ProjectError),

    #[error("Failed to read problem file: {path}")]
    ProblemFileRead {
        path: PathBuf,
        source: cx_project::ProjectError,
    },

    #[error("Model error: {0}")]
    Model(#[from] cx_energy::EnergyError),

    #[error("Solver error: {0}")]
    Solver(#[from] cx_solver::SolverError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
