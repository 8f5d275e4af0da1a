//! Error types for markowitz.

use thiserror::Error;

/// Error type for frontier computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontierError {
    /// Fewer than two return periods were supplied.
    #[error("Insufficient data: need at least 2 return periods, got {periods}")]
    InsufficientData { periods: usize },

    /// Input contains non-finite values or is otherwise malformed.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The quadratic objective is not positive definite.
    #[error("Singular covariance: smallest eigenvalue {min_eigenvalue:e} is not positive")]
    SingularCovariance { min_eigenvalue: f64 },

    /// No portfolio satisfies every constraint for the requested target.
    #[error("Infeasible constraints for target return {target}: {reason}")]
    InfeasibleConstraints { target: f64, reason: String },

    /// The return data provider failed.
    #[error("Failed to fetch returns for '{ticker}': {reason}")]
    AssetFetch { ticker: String, reason: String },

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Solver error.
    #[error("Solver error: {0}")]
    SolverError(String),

    /// Numerical error.
    #[error("Numerical error: {0}")]
    NumericalError(String),
}

impl FrontierError {
    /// True for failures raised while solving a quadratic program, as opposed
    /// to data or configuration problems.
    pub fn is_solver_failure(&self) -> bool {
        matches!(
            self,
            FrontierError::SingularCovariance { .. }
                | FrontierError::InfeasibleConstraints { .. }
                | FrontierError::SolverError(_)
                | FrontierError::NumericalError(_)
        )
    }

    /// The target return this error refers to, if any.
    pub fn target(&self) -> Option<f64> {
        match self {
            FrontierError::InfeasibleConstraints { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub(crate) fn shape(expected: impl Into<String>, got: impl Into<String>) -> Self {
        FrontierError::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Result type for markowitz operations.
pub type Result<T> = std::result::Result<T, FrontierError>;
