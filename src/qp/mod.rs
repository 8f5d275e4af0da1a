//! Quadratic programming for portfolio selection.
//!
//! This module provides:
//! - Formulation of the minimum-variance problem in quadprog form (D, d, A, b, meq)
//! - The `QpSolver` seam and its Clarabel implementation

pub mod clarabel;
pub mod formulation;

use nalgebra::DVector;

use crate::error::Result;

pub use self::clarabel::{ClarabelSolver, SolverSettings, SolveStatus};
pub use formulation::{
    check_reachable, formulate, formulate_min_variance, reachable_returns, QpProblem,
};

/// A convex quadratic program solver.
///
/// Given a [`QpProblem`], returns the unique `w` minimizing
/// `½ wᵗDw − dᵗw` subject to `Aᵗw = b` on the first `meq` columns of `A`
/// and `Aᵗw ≥ b` on the rest.
///
/// Implementations must not keep state between calls: the frontier builder
/// may call `solve` from several threads at once.
pub trait QpSolver: Send + Sync {
    /// Solve the problem.
    ///
    /// # Errors
    ///
    /// - `SingularCovariance` when `D` is not positive definite
    /// - `InfeasibleConstraints` when no `w` satisfies the constraints
    /// - `SolverError` / `NumericalError` for anything else
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>>;
}

impl<S: QpSolver + ?Sized> QpSolver for &S {
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>> {
        (**self).solve(problem)
    }
}

impl<S: QpSolver + ?Sized> QpSolver for Box<S> {
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>> {
        (**self).solve(problem)
    }
}
