//! Frontier construction.
//!
//! The builder solves the global minimum-variance portfolio once, resolves
//! the target grid, then for each target formulates the QP, solves it,
//! cleans the weights and records an immutable [`PortfolioPoint`]. Targets
//! are independent of each other and may be solved in parallel.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::config::{FailurePolicy, FrontierConfig};
use super::grid::TargetGrid;
use super::point::{Frontier, FrontierEntry, PortfolioPoint, TargetFailure};
use crate::cleaner::{CleanedWeights, NumericalCleaner};
use crate::data::{load_return_matrix, ReturnMatrix, ReturnSource};
use crate::error::{FrontierError, Result};
use crate::moments::{estimate_moments, Moments};
use crate::qp::{
    check_reachable, formulate, formulate_min_variance, reachable_returns, ClarabelSolver,
    QpProblem, QpSolver,
};
use crate::universe::AssetUniverse;

/// Computes efficient frontiers.
///
/// ```ignore
/// use markowitz::prelude::*;
///
/// let frontier = FrontierBuilder::new(FrontierConfig::default().with_increment(20))
///     .compute(&universe, &returns)?;
///
/// for point in frontier.points() {
///     println!("{:.4} {:.4}", point.target_return, point.std_dev);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FrontierBuilder<S = ClarabelSolver> {
    config: FrontierConfig,
    cleaner: NumericalCleaner,
    solver: S,
}

impl FrontierBuilder<ClarabelSolver> {
    /// Create a builder using the Clarabel solver with default settings.
    pub fn new(config: FrontierConfig) -> Self {
        FrontierBuilder {
            cleaner: NumericalCleaner::new(config.cleaner),
            config,
            solver: ClarabelSolver::default(),
        }
    }
}

impl Default for FrontierBuilder<ClarabelSolver> {
    fn default() -> Self {
        FrontierBuilder::new(FrontierConfig::default())
    }
}

impl<S: QpSolver> FrontierBuilder<S> {
    /// Replace the QP solver.
    pub fn with_solver<T: QpSolver>(self, solver: T) -> FrontierBuilder<T> {
        FrontierBuilder {
            config: self.config,
            cleaner: self.cleaner,
            solver,
        }
    }

    pub fn config(&self) -> &FrontierConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Fetch returns for the universe from `source` and compute the frontier.
    ///
    /// The configured `period` and `lookback` are passed to the source.
    pub fn compute_from_source<R: ReturnSource + ?Sized>(
        &self,
        source: &R,
        universe: &AssetUniverse,
    ) -> Result<Frontier> {
        self.config.validate()?;
        let returns = load_return_matrix(source, universe, self.config.period, self.config.lookback)?;
        self.compute(universe, &returns)
    }

    /// Estimate moments from `returns` and compute the frontier.
    pub fn compute(&self, universe: &AssetUniverse, returns: &ReturnMatrix) -> Result<Frontier> {
        self.config.validate()?;
        if returns.assets() != universe.len() {
            return Err(FrontierError::shape(
                format!("{} return columns", universe.len()),
                returns.assets().to_string(),
            ));
        }
        let moments = estimate_moments(returns)?;
        self.compute_from_moments(universe, &moments)
    }

    /// Compute the frontier for fixed moments.
    ///
    /// # Errors
    ///
    /// Configuration, shape and covariance problems always abort. Per-target
    /// failures abort under [`FailurePolicy::FailFast`] and are recorded in
    /// the frontier under [`FailurePolicy::SkipAndContinue`].
    ///
    /// The global minimum-variance portfolio is solved first. A singular
    /// covariance found there always aborts. Any other failure of that solve
    /// aborts under `FailFast` or when the grid is [`TargetGrid::Achievable`],
    /// which starts at its return; otherwise the frontier is returned without
    /// a minimum-variance point.
    pub fn compute_from_moments(
        &self,
        universe: &AssetUniverse,
        moments: &Moments,
    ) -> Result<Frontier> {
        self.config.validate()?;
        if moments.assets() != universe.len() {
            return Err(FrontierError::shape(
                format!("moments for {} assets", universe.len()),
                moments.assets().to_string(),
            ));
        }

        // Also surfaces a singular covariance before any target is tried.
        let min_variance = match self.min_variance_portfolio(moments) {
            Ok(point) => Some(point),
            Err(error @ FrontierError::SingularCovariance { .. }) => return Err(error),
            Err(error)
                if self.config.failure_policy == FailurePolicy::FailFast
                    || self.config.grid == TargetGrid::Achievable =>
            {
                return Err(error)
            }
            Err(error) => {
                warn!(%error, "skipping minimum-variance portfolio");
                None
            }
        };

        let achievable = match (&min_variance, reachable_returns(moments, self.config.long_only)) {
            (Some(gmv), Some((_, hi))) => Some((gmv.expected_return, hi)),
            _ => None,
        };
        let targets = self.config.grid.resolve(self.config.increment, achievable)?;

        info!(
            assets = universe.len(),
            targets = targets.len(),
            policy = ?self.config.failure_policy,
            parallel = self.config.parallel,
            "computing efficient frontier"
        );

        let entries = if self.config.parallel {
            let outcomes: Vec<(f64, Result<PortfolioPoint>)> = targets
                .par_iter()
                .map(|&t| (t, self.solve_target(moments, t)))
                .collect();
            self.collect_entries(outcomes)?
        } else {
            self.collect_entries(targets.iter().map(|&t| (t, self.solve_target(moments, t))))?
        };

        Ok(Frontier::new(
            universe.tickers().to_vec(),
            self.config.risk_free_rate,
            min_variance,
            entries,
        ))
    }

    /// Solve the minimum-variance portfolio for one target return.
    pub fn solve_target(&self, moments: &Moments, target: f64) -> Result<PortfolioPoint> {
        let long_only = self.config.long_only;

        if let Some(range) = reachable_returns(moments, long_only) {
            check_reachable(target, range)?;
        }

        let qp = formulate(moments, target, long_only)?;
        let cleaned = self.solve_and_clean(&qp).map_err(|e| in_context(e, target))?;
        let point = PortfolioPoint::from_weights(
            moments,
            target,
            cleaned.weights,
            cleaned.residual,
            self.config.risk_free_rate,
        );

        debug!(target, std_dev = point.std_dev, "solved frontier point");
        Ok(point)
    }

    /// Solve the global minimum-variance portfolio (budget and, if
    /// configured, no short sales; no target return).
    ///
    /// The point's `target_return` is its own expected return.
    pub fn min_variance_portfolio(&self, moments: &Moments) -> Result<PortfolioPoint> {
        let qp = formulate_min_variance(moments, self.config.long_only)?;
        let cleaned = self.solve_and_clean(&qp)?;
        let ret = moments.portfolio_return(&cleaned.weights);
        Ok(PortfolioPoint::from_weights(
            moments,
            ret,
            cleaned.weights,
            cleaned.residual,
            self.config.risk_free_rate,
        ))
    }

    fn solve_and_clean(&self, qp: &QpProblem) -> Result<CleanedWeights> {
        let raw = self.solver.solve(qp)?;
        let cleaned = self.cleaner.clean(&raw, self.config.long_only)?;
        if cleaned.clamped > 0 {
            debug!(
                clamped = cleaned.clamped,
                residual = cleaned.residual,
                "clamped negligible weights"
            );
        }
        Ok(cleaned)
    }

    /// Apply the failure policy to per-target outcomes, in grid order.
    fn collect_entries<I>(&self, outcomes: I) -> Result<Vec<FrontierEntry>>
    where
        I: IntoIterator<Item = (f64, Result<PortfolioPoint>)>,
    {
        let mut entries = Vec::new();
        for (target, outcome) in outcomes {
            match outcome {
                Ok(point) => entries.push(FrontierEntry::Solved(point)),
                Err(error) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(error),
                    FailurePolicy::SkipAndContinue => {
                        warn!(target, %error, "skipping frontier target");
                        entries.push(FrontierEntry::Failed(TargetFailure { target, error }));
                    }
                },
            }
        }
        Ok(entries)
    }
}

/// Name the target in errors that do not already carry it.
fn in_context(error: FrontierError, target: f64) -> FrontierError {
    match error {
        FrontierError::SolverError(msg) => {
            FrontierError::SolverError(format!("target return {}: {}", target, msg))
        }
        FrontierError::NumericalError(msg) => {
            FrontierError::NumericalError(format!("target return {}: {}", target, msg))
        }
        FrontierError::InfeasibleConstraints { reason, .. } => {
            FrontierError::InfeasibleConstraints { target, reason }
        }
        other => other,
    }
}

/// Compute a frontier from returns with the default Clarabel solver.
pub fn efficient_frontier(
    universe: &AssetUniverse,
    returns: &ReturnMatrix,
    config: FrontierConfig,
) -> Result<Frontier> {
    FrontierBuilder::new(config).compute(universe, returns)
}
