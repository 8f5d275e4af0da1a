//! Target return grids.

use serde::{Deserialize, Serialize};

use crate::error::{FrontierError, Result};

/// Fraction of the achievable span kept away from the maximum return.
///
/// At exactly max μ the only long-only portfolio is the single best asset and
/// the feasible set has no interior, which interior point solvers handle
/// poorly.
pub const ACHIEVABLE_EDGE: f64 = 1e-6;

/// Which target returns a frontier is solved for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetGrid {
    /// `increment` points from the global minimum-variance return up to the
    /// largest return reachable without short sales. Only the efficient
    /// (upper) branch is traced.
    #[default]
    Achievable,
    /// `increment` evenly spaced points between `min` and `max`, inclusive.
    Linear { min: f64, max: f64 },
    /// Exactly these targets, in this order.
    Explicit { targets: Vec<f64> },
}

impl TargetGrid {
    pub fn validate(&self) -> Result<()> {
        match self {
            TargetGrid::Achievable => Ok(()),
            TargetGrid::Linear { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(FrontierError::InvalidConfig(format!(
                        "grid bounds must be finite, got [{}, {}]",
                        min, max
                    )));
                }
                if min > max {
                    return Err(FrontierError::InvalidConfig(format!(
                        "grid lower bound {} exceeds upper bound {}",
                        min, max
                    )));
                }
                Ok(())
            }
            TargetGrid::Explicit { targets } => {
                if targets.is_empty() {
                    return Err(FrontierError::InvalidConfig("explicit grid is empty".into()));
                }
                if let Some(t) = targets.iter().find(|t| !t.is_finite()) {
                    return Err(FrontierError::InvalidConfig(format!(
                        "grid target {} is not finite",
                        t
                    )));
                }
                Ok(())
            }
        }
    }

    /// Produce the target returns.
    ///
    /// `achievable` is the `(min variance return, max return)` range and is
    /// only read by [`TargetGrid::Achievable`].
    pub fn resolve(&self, increment: usize, achievable: Option<(f64, f64)>) -> Result<Vec<f64>> {
        self.validate()?;
        match self {
            TargetGrid::Achievable => {
                let (lo, hi) = achievable.ok_or_else(|| {
                    FrontierError::InvalidConfig("achievable range is unknown".into())
                })?;
                let hi = hi - ACHIEVABLE_EDGE * (hi - lo).max(0.0);
                Ok(linspace(lo, hi.max(lo), increment))
            }
            TargetGrid::Linear { min, max } => Ok(linspace(*min, *max, increment)),
            TargetGrid::Explicit { targets } => Ok(targets.clone()),
        }
    }
}

/// `k` evenly spaced values from `lo` to `hi`. A single point is `lo`.
pub fn linspace(lo: f64, hi: f64, k: usize) -> Vec<f64> {
    match k {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (k - 1) as f64;
            (0..k)
                .map(|i| if i == k - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}
