use thiserror::Error;

/// Workspace-wide numeric error.
#[derive(Error, Debug)]
pub enum CxError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },
}
