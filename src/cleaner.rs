//! Cleanup of solver weight vectors.
//!
//! Interior point solutions carry noise of order the solver tolerance:
//! weights that should be zero come back as `1e-9` or `-3e-10`. Entries below
//! the tolerance in magnitude are set to zero, and the vector is then
//! renormalized according to [`Renormalize`].

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{FrontierError, Result};

/// What to do with the mass removed by clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Renormalize {
    /// Divide by the post-clamp sum so the weights sum to 1.
    #[default]
    Proportional,
    /// Leave the weights as clamped and report `1 - sum` as the residual.
    Residual,
}

/// Cleaner settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Weights with magnitude below this are set to zero.
    pub tolerance: f64,
    pub renormalize: Renormalize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        CleanerConfig {
            tolerance: 1e-5,
            renormalize: Renormalize::Proportional,
        }
    }
}

/// Weights after cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedWeights {
    pub weights: DVector<f64>,
    /// `1 - sum(weights)` after cleanup; zero up to rounding under
    /// [`Renormalize::Proportional`].
    pub residual: f64,
    /// Number of entries set to zero.
    pub clamped: usize,
}

/// Zero-clamps solver noise and renormalizes weight vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericalCleaner {
    config: CleanerConfig,
}

impl NumericalCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        NumericalCleaner { config }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean a raw weight vector.
    ///
    /// # Errors
    ///
    /// - `NumericalError` if any weight is non-finite
    /// - `NumericalError` if `long_only` and a weight is below `-tolerance`,
    ///   which is a real short position rather than noise
    /// - `NumericalError` if the weights sum to zero or less after clamping
    pub fn clean(&self, raw: &DVector<f64>, long_only: bool) -> Result<CleanedWeights> {
        let tol = self.config.tolerance;

        if raw.iter().any(|w| !w.is_finite()) {
            return Err(FrontierError::NumericalError(
                "solver returned non-finite weights".into(),
            ));
        }
        if long_only {
            if let Some((i, w)) = raw.iter().enumerate().find(|(_, w)| **w <= -tol) {
                return Err(FrontierError::NumericalError(format!(
                    "weight {} of asset {} is negative beyond tolerance {:e}",
                    w, i, tol
                )));
            }
        }

        let mut clamped = 0;
        let mut weights = raw.map(|w| {
            if w.abs() < tol {
                clamped += 1;
                0.0
            } else {
                w
            }
        });

        let sum = weights.sum();
        if sum <= 0.0 {
            return Err(FrontierError::NumericalError(format!(
                "weights sum to {} after clamping",
                sum
            )));
        }

        if self.config.renormalize == Renormalize::Proportional {
            weights /= sum;
        }
        let residual = 1.0 - weights.sum();

        Ok(CleanedWeights {
            weights,
            residual,
            clamped,
        })
    }
}
