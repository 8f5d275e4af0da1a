//! Clarabel solver integration.
//!
//! Clarabel solves `min ½xᵗPx + qᵗx  s.t.  Ax + s = b, s ∈ K`. A quadprog-style
//! [`QpProblem`] maps onto it with `P = D`, `q = −d`, one zero-cone row per
//! equality column of `A` and one nonnegative-cone row `−Aⱼᵗx + s = −bⱼ` per
//! inequality column.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::formulation::{check_reachable, QpProblem};
use super::QpSolver;
use crate::error::{FrontierError, Result};
use crate::sparse::{dense_to_csc, dense_upper_to_csc};

/// Solution status from the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// Solved to reduced accuracy.
    AlmostOptimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Maximum iterations or time reached.
    MaxIterations,
    /// Numerical difficulties.
    NumericalError,
    /// Unknown status.
    Unknown,
}

impl From<SolverStatus> for SolveStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Solved => SolveStatus::Optimal,
            SolverStatus::AlmostSolved => SolveStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                SolveStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                SolveStatus::Unbounded
            }
            SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::MaxIterations,
            SolverStatus::NumericalError => SolveStatus::NumericalError,
            _ => SolveStatus::Unknown,
        }
    }
}

/// Solver settings.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Print solver output.
    pub verbose: bool,
    /// Maximum iterations.
    pub max_iter: u32,
    /// Time limit in seconds.
    pub time_limit: f64,
    /// Absolute tolerance.
    pub tol_gap_abs: f64,
    /// Relative tolerance.
    pub tol_gap_rel: f64,
    /// D is treated as singular when its smallest eigenvalue is at most this
    /// fraction of its largest.
    pub pd_tolerance: f64,
    /// Largest constraint violation accepted in a returned solution.
    pub feasibility_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            verbose: false,
            max_iter: 200,
            time_limit: f64::INFINITY,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            pd_tolerance: 1e-10,
            feasibility_tolerance: 1e-6,
        }
    }
}

/// [`QpSolver`] backed by the Clarabel interior point solver.
///
/// Every call builds its own Clarabel instance, so one `ClarabelSolver` can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    settings: SolverSettings,
}

impl ClarabelSolver {
    pub fn new(settings: SolverSettings) -> Self {
        ClarabelSolver { settings }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

impl QpSolver for ClarabelSolver {
    fn solve(&self, problem: &QpProblem) -> Result<DVector<f64>> {
        problem.check_dimensions()?;
        check_positive_definite(&problem.dmat, self.settings.pd_tolerance)?;

        // Targets just past the simplex edge make Clarabel stall instead of
        // certifying infeasibility.
        if let (Some(target), Some(range)) = (problem.target, problem.target_range()) {
            check_reachable(target, range)?;
        }

        let (a, b) = stack_constraints(problem);
        let p = to_clarabel_csc(&dense_upper_to_csc(&problem.dmat));
        let a = to_clarabel_csc(&dense_to_csc(&a));
        let q: Vec<f64> = problem.dvec.iter().map(|v| -v).collect();
        let cones = to_clarabel_cones(problem.meq, problem.num_inequalities());

        let clarabel_settings = DefaultSettingsBuilder::default()
            .verbose(self.settings.verbose)
            .max_iter(self.settings.max_iter)
            .time_limit(self.settings.time_limit)
            .tol_gap_abs(self.settings.tol_gap_abs)
            .tol_gap_rel(self.settings.tol_gap_rel)
            .build()
            .map_err(|e| FrontierError::SolverError(format!("invalid solver settings: {}", e)))?;

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, clarabel_settings);
        solver.solve();

        let status: SolveStatus = solver.solution.status.into();
        debug!(
            ?status,
            target = ?problem.target,
            iterations = solver.info.iterations,
            solve_time = solver.solution.solve_time,
            "clarabel finished"
        );

        match status {
            SolveStatus::Optimal | SolveStatus::AlmostOptimal => {
                let w = DVector::from_column_slice(&solver.solution.x);
                let violation = problem.max_violation(&w);
                if violation > self.settings.feasibility_tolerance {
                    return Err(FrontierError::NumericalError(format!(
                        "solution violates constraints by {:e} (status {:?})",
                        violation, status
                    )));
                }
                Ok(w)
            }
            SolveStatus::Infeasible => Err(FrontierError::InfeasibleConstraints {
                target: problem.target.unwrap_or(f64::NAN),
                reason: "solver reported the constraints primal infeasible".into(),
            }),
            other => Err(FrontierError::SolverError(format!(
                "solver stopped with status {:?}",
                other
            ))),
        }
    }
}

/// Fail with `SingularCovariance` unless the symmetric matrix is positive definite.
///
/// The smallest eigenvalue must exceed `rel_tol` times the largest absolute
/// eigenvalue.
pub fn check_positive_definite(m: &DMatrix<f64>, rel_tol: f64) -> Result<()> {
    if m.is_empty() {
        return Err(FrontierError::InvalidData("empty quadratic term".into()));
    }
    let eigenvalues = m.symmetric_eigenvalues();
    let min = eigenvalues.min();
    let scale = eigenvalues.amax();
    if min.is_nan() || min <= rel_tol * scale {
        return Err(FrontierError::SingularCovariance { min_eigenvalue: min });
    }
    Ok(())
}

/// Build Clarabel's (A, b): equality rows as is, inequality rows negated.
fn stack_constraints(problem: &QpProblem) -> (DMatrix<f64>, Vec<f64>) {
    let mut a = problem.amat.transpose();
    let mut b: Vec<f64> = problem.bvec.iter().copied().collect();
    for j in problem.meq..problem.num_constraints() {
        a.row_mut(j).neg_mut();
        b[j] = -b[j];
    }
    (a, b)
}

/// Convert nalgebra CSC to Clarabel CSC.
fn to_clarabel_csc(m: &nalgebra_sparse::CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        m.col_offsets().to_vec(),
        m.row_indices().to_vec(),
        m.values().to_vec(),
    )
}

fn to_clarabel_cones(zero: usize, nonneg: usize) -> Vec<SupportedConeT<f64>> {
    let mut cones = Vec::new();

    if zero > 0 {
        cones.push(SupportedConeT::ZeroConeT(zero));
    }

    if nonneg > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(nonneg));
    }

    cones
}
