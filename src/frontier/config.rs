//! Frontier computation settings.

use serde::{Deserialize, Serialize};

use super::grid::TargetGrid;
use crate::cleaner::CleanerConfig;
use crate::data::Period;
use crate::error::{FrontierError, Result};

/// What the builder does when a target return cannot be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort on the first failure and return its error.
    #[default]
    FailFast,
    /// Record the failure in the frontier and continue with the next target.
    SkipAndContinue,
}

/// Settings for a frontier computation.
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes:
///
/// ```
/// use markowitz::FrontierConfig;
///
/// let config = FrontierConfig::from_json(r#"{ "increment": 25, "risk_free_rate": 0.002 }"#).unwrap();
/// assert_eq!(config.increment, 25);
/// assert!(config.long_only);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierConfig {
    /// Number of frontier points for generated grids.
    pub increment: usize,
    /// Per-period risk-free rate used in the Sharpe ratio.
    pub risk_free_rate: f64,
    /// Forbid short positions.
    pub long_only: bool,
    /// Target returns to solve for.
    pub grid: TargetGrid,
    pub failure_policy: FailurePolicy,
    pub cleaner: CleanerConfig,
    /// Solve targets on the rayon thread pool.
    pub parallel: bool,
    /// Sampling period requested from a return source.
    pub period: Period,
    /// Number of trailing periods requested from a return source.
    pub lookback: Option<usize>,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        FrontierConfig {
            increment: 100,
            risk_free_rate: 0.0,
            long_only: true,
            grid: TargetGrid::Achievable,
            failure_policy: FailurePolicy::FailFast,
            cleaner: CleanerConfig::default(),
            parallel: false,
            period: Period::Months,
            lookback: None,
        }
    }
}

impl FrontierConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FrontierConfig = serde_json::from_str(json)
            .map_err(|e| FrontierError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_increment(mut self, increment: usize) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn with_grid(mut self, grid: TargetGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_long_only(mut self, long_only: bool) -> Self {
        self.long_only = long_only;
        self
    }

    pub fn with_cleaner(mut self, cleaner: CleanerConfig) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = Some(lookback);
        self
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.increment == 0 {
            return Err(FrontierError::InvalidConfig("increment must be positive".into()));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(FrontierError::InvalidConfig(format!(
                "risk-free rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        if !(self.cleaner.tolerance > 0.0 && self.cleaner.tolerance.is_finite()) {
            return Err(FrontierError::InvalidConfig(format!(
                "cleaner tolerance must be positive, got {}",
                self.cleaner.tolerance
            )));
        }
        if self.lookback == Some(0) {
            return Err(FrontierError::InvalidConfig("lookback must be positive".into()));
        }
        if matches!(self.grid, TargetGrid::Achievable) && !self.long_only {
            return Err(FrontierError::InvalidConfig(
                "the achievable grid needs long_only; with short sales the return range is unbounded"
                    .into(),
            ));
        }
        self.grid.validate()
    }
}
