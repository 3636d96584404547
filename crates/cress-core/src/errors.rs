use crate::mode::Mode;
use thiserror::Error;

/// Error type for invalid parameter sets, records and analysis requests.
#[derive(Error, Debug)]
pub enum CressError {
    #[error("Missing required parameter '{name}' in group '{group}'")]
    MissingParameter { group: String, name: String },
    #[error("Parameter '{name}' in group '{group}' has no values")]
    EmptyParameter { group: String, name: String },
    #[error("Wrong type for parameter '{name}' in group '{group}'. Expected {expected}, got {actual}")]
    WrongType {
        group: String,
        name: String,
        expected: String,
        actual: String,
    },
    #[error("Parameter '{name}' in group '{group}' has {actual} values but {expected} are required for {mode} mode")]
    WrongLength {
        group: String,
        name: String,
        expected: usize,
        actual: usize,
        mode: Mode,
    },
    #[error("Parameter '{name}' in group '{group}' is not an input of this calculation")]
    UnknownParameter { group: String, name: String },
    #[error("Invalid value for parameter '{name}' in group '{group}': {reason}")]
    InvalidValue {
        group: String,
        name: String,
        reason: String,
    },
    #[error("Upstream results have {actual} mode shape but {expected} mode was resolved")]
    ModeMismatch { expected: Mode, actual: Mode },
    #[error("Variable '{name}' is present in both upstream results")]
    NamespaceConflict { name: String },
    #[error("Result for variable '{variable}' has no '{metric}' curve")]
    MissingMetric { variable: String, metric: String },
    #[error("Invalid sampling settings for '{name}': {reason}")]
    Sampling { name: String, reason: String },
}

/// Convenience type for `Result<T, CressError>`.
pub type CressResult<T> = Result<T, CressError>;
