//! cx-project: coexistence problem files, validation and solution reports.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_problem};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse and validate a problem from YAML text.
pub fn parse_yaml(content: &str) -> ProjectResult<ProblemDef> {
    let problem: ProblemDef = serde_yaml::from_str(content)?;
    validate_problem(&problem)?;
    Ok(problem)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<ProblemDef> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn save_yaml(path: &std::path::Path, problem: &ProblemDef) -> ProjectResult<()> {
    validate_problem(problem)?;
    let content = serde_yaml::to_string(problem)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<ProblemDef> {
    let content = std::fs::read_to_string(path)?;
    let problem: ProblemDef = serde_json::from_str(&content)?;
    validate_problem(&problem)?;
    Ok(problem)
}

pub fn save_json(path: &std::path::Path, problem: &ProblemDef) -> ProjectResult<()> {
    validate_problem(problem)?;
    let content = serde_json::to_string_pretty(problem)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a problem, picking the format from the file extension (YAML unless `.json`).
pub fn load_problem(path: &std::path::Path) -> ProjectResult<ProblemDef> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

pub fn save_report_json(path: &std::path::Path, report: &SolutionReport) -> ProjectResult<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}
