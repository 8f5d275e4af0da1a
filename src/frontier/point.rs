//! Frontier results.

use nalgebra::DVector;
use serde::{Serialize, Serializer};

use crate::error::FrontierError;
use crate::moments::Moments;

/// One solved portfolio on the frontier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioPoint {
    /// Target return the portfolio was solved for.
    pub target_return: f64,
    /// μᵗw of the cleaned weights.
    pub expected_return: f64,
    /// sqrt(wᵗΣw) of the cleaned weights.
    pub std_dev: f64,
    /// `(target_return - rf) / std_dev`; `None` when `std_dev` is zero.
    pub sharpe_ratio: Option<f64>,
    /// One weight per asset, in universe order.
    pub weights: Vec<f64>,
    /// `1 - sum(weights)`. Zero up to rounding unless the cleaner leaves
    /// clamped mass unallocated ([`Renormalize::Residual`]).
    ///
    /// [`Renormalize::Residual`]: crate::cleaner::Renormalize::Residual
    pub residual: f64,
}

impl PortfolioPoint {
    /// Build a point from cleaned weights, computing its risk and Sharpe ratio.
    pub fn from_weights(
        moments: &Moments,
        target_return: f64,
        weights: DVector<f64>,
        residual: f64,
        risk_free_rate: f64,
    ) -> Self {
        let std_dev = moments.portfolio_std_dev(&weights);
        let sharpe_ratio = sharpe_ratio(target_return, std_dev, risk_free_rate);
        PortfolioPoint {
            target_return,
            expected_return: moments.portfolio_return(&weights),
            std_dev,
            sharpe_ratio,
            weights: weights.as_slice().to_vec(),
            residual,
        }
    }

    pub fn weights_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.weights)
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

/// Excess return per unit of risk. Undefined for a riskless portfolio.
pub fn sharpe_ratio(ret: f64, std_dev: f64, risk_free_rate: f64) -> Option<f64> {
    (std_dev > 0.0).then(|| (ret - risk_free_rate) / std_dev)
}

/// A target return that could not be solved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetFailure {
    pub target: f64,
    #[serde(serialize_with = "serialize_display")]
    pub error: FrontierError,
}

fn serialize_display<S: Serializer>(error: &FrontierError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Outcome for one target of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrontierEntry {
    Solved(PortfolioPoint),
    Failed(TargetFailure),
}

impl FrontierEntry {
    pub fn target(&self) -> f64 {
        match self {
            FrontierEntry::Solved(p) => p.target_return,
            FrontierEntry::Failed(f) => f.target,
        }
    }

    pub fn point(&self) -> Option<&PortfolioPoint> {
        match self {
            FrontierEntry::Solved(p) => Some(p),
            FrontierEntry::Failed(_) => None,
        }
    }
}

/// An efficient frontier: one entry per requested target, in grid order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frontier {
    tickers: Vec<String>,
    risk_free_rate: f64,
    min_variance: Option<PortfolioPoint>,
    entries: Vec<FrontierEntry>,
}

impl Frontier {
    pub(crate) fn new(
        tickers: Vec<String>,
        risk_free_rate: f64,
        min_variance: Option<PortfolioPoint>,
        entries: Vec<FrontierEntry>,
    ) -> Self {
        Frontier {
            tickers,
            risk_free_rate,
            min_variance,
            entries,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn entries(&self) -> &[FrontierEntry] {
        &self.entries
    }

    /// Number of entries, solved or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Solved points in grid order.
    pub fn points(&self) -> impl Iterator<Item = &PortfolioPoint> {
        self.entries.iter().filter_map(FrontierEntry::point)
    }

    /// Failed targets in grid order.
    pub fn failures(&self) -> impl Iterator<Item = &TargetFailure> {
        self.entries.iter().filter_map(|e| match e {
            FrontierEntry::Failed(f) => Some(f),
            FrontierEntry::Solved(_) => None,
        })
    }

    /// True when every target was solved.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The global minimum-variance portfolio.
    ///
    /// `None` only when its solve failed and the run skipped the failure.
    pub fn min_variance(&self) -> Option<&PortfolioPoint> {
        self.min_variance.as_ref()
    }

    /// The solved point with the highest Sharpe ratio.
    pub fn max_sharpe(&self) -> Option<&PortfolioPoint> {
        self.points()
            .filter(|p| p.sharpe_ratio.is_some())
            .max_by(|a, b| {
                a.sharpe_ratio
                    .partial_cmp(&b.sharpe_ratio)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Tabular view with columns target return, std dev, one weight per
    /// asset and Sharpe ratio. Failed targets and undefined Sharpe ratios
    /// are NaN.
    pub fn to_table(&self) -> FrontierTable {
        let n = self.tickers.len();
        let mut columns = Vec::with_capacity(n + 3);
        columns.push("target_return".to_string());
        columns.push("std_dev".to_string());
        columns.extend(self.tickers.iter().cloned());
        columns.push("sharpe_ratio".to_string());

        let rows = self
            .entries
            .iter()
            .map(|entry| match entry {
                FrontierEntry::Solved(p) => {
                    let mut row = Vec::with_capacity(n + 3);
                    row.push(p.target_return);
                    row.push(p.std_dev);
                    row.extend_from_slice(&p.weights);
                    row.push(p.sharpe_ratio.unwrap_or(f64::NAN));
                    row
                }
                FrontierEntry::Failed(f) => {
                    let mut row = vec![f64::NAN; n + 3];
                    row[0] = f.target;
                    row
                }
            })
            .collect();

        FrontierTable { columns, rows }
    }
}

/// Rectangular frontier export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontierTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}
