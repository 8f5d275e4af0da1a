//! # markowitz
//!
//! Mean-variance efficient portfolios solved as quadratic programs.
//!
//! Given periodic returns for a set of assets, markowitz estimates expected
//! returns and covariance, then for each target return solves
//!
//! ```text
//! minimize    wᵗΣw
//! subject to  1ᵗw = 1,  μᵗw = r,  w >= 0
//! ```
//!
//! and collects the solutions into an efficient frontier annotated with risk
//! and Sharpe ratio.
//!
//! ## Quick Start
//!
//! ```ignore
//! use markowitz::prelude::*;
//!
//! let universe = AssetUniverse::new(["SPY", "TLT", "GLD"])?;
//! let returns = ReturnMatrix::from_columns(vec![spy, tlt, gld])?;
//!
//! let config = FrontierConfig::default()
//!     .with_increment(50)
//!     .with_risk_free_rate(0.001);
//! let frontier = efficient_frontier(&universe, &returns, config)?;
//!
//! if let Some(best) = frontier.max_sharpe() {
//!     println!("tangency weights: {:?}", best.weights);
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Moments**: sample mean and covariance (divisor T − 1) of the returns
//! - **Formulation**: the QP in quadprog form, `D = 2Σ`, `d = 0`, columns of
//!   `A` for budget, target return and non-negativity, `meq = 2`
//! - **Solver**: any [`QpSolver`]; [`ClarabelSolver`] by default
//! - **Cleanup**: weights below `1e-5` in magnitude are zeroed, the rest
//!   renormalized to sum to one
//! - **Frontier**: one [`PortfolioPoint`] per target, under a fail-fast or
//!   skip-and-continue failure policy
//!
//! ## Data
//!
//! Price download and resampling are not part of this crate. Implement
//! [`ReturnSource`] for a provider, or build a [`ReturnMatrix`] directly.
//!
//! ## Logging
//!
//! Progress is reported through `tracing`. Install a subscriber to see it.

pub mod cleaner;
pub mod data;
pub mod error;
pub mod frontier;
pub mod moments;
pub mod qp;
pub mod sparse;
pub mod universe;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use markowitz::prelude::*;
/// ```
pub mod prelude {
    // Inputs
    pub use crate::data::{load_return_matrix, InMemorySource, Period, ReturnMatrix, ReturnSource};
    pub use crate::universe::AssetUniverse;

    // Estimation
    pub use crate::moments::{estimate_moments, Moments};

    // QP
    pub use crate::qp::{
        formulate, formulate_min_variance, ClarabelSolver, QpProblem, QpSolver, SolverSettings,
    };

    // Cleanup
    pub use crate::cleaner::{CleanerConfig, NumericalCleaner, Renormalize};

    // Frontier
    pub use crate::frontier::{
        efficient_frontier, FailurePolicy, Frontier, FrontierBuilder, FrontierConfig,
        FrontierEntry, PortfolioPoint, TargetGrid,
    };

    // Errors
    pub use crate::error::{FrontierError, Result};
}

// Re-export main types at crate root
pub use data::{ReturnMatrix, ReturnSource};
pub use error::{FrontierError, Result};
pub use frontier::{efficient_frontier, Frontier, FrontierBuilder, FrontierConfig, PortfolioPoint};
pub use moments::Moments;
pub use qp::{ClarabelSolver, QpSolver};
pub use universe::AssetUniverse;
