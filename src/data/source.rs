//! Return data providers.
//!
//! Price download, resampling and date trimming are done by whatever
//! implements [`ReturnSource`]. The core only ever sees the assembled
//! [`ReturnMatrix`], so everything downstream stays synchronous and can be
//! tested without network access.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::returns::ReturnMatrix;
use crate::error::{FrontierError, Result};
use crate::universe::AssetUniverse;

/// Sampling period of the return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weeks,
    #[default]
    Months,
    Quarters,
    Years,
}

impl Period {
    /// Number of periods in one year.
    pub fn periods_per_year(self) -> f64 {
        match self {
            Period::Weeks => 52.0,
            Period::Months => 12.0,
            Period::Quarters => 4.0,
            Period::Years => 1.0,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Weeks => "weeks",
            Period::Months => "months",
            Period::Quarters => "quarters",
            Period::Years => "years",
        };
        f.write_str(name)
    }
}

/// A provider of periodic return series.
///
/// Implementations report every failure as [`FrontierError::AssetFetch`] so
/// callers can tell data problems apart from solver problems.
pub trait ReturnSource {
    /// Fetch the return series of one ticker, oldest first.
    ///
    /// `lookback` limits the series to the most recent periods.
    fn fetch_returns(&self, ticker: &str, period: Period, lookback: Option<usize>)
        -> Result<Vec<f64>>;
}

/// Return series held in memory, all sampled at one period.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    period: Period,
    series: HashMap<String, Vec<f64>>,
}

impl InMemorySource {
    pub fn new(period: Period) -> Self {
        InMemorySource {
            period,
            series: HashMap::new(),
        }
    }

    /// Add or replace the series of a ticker.
    pub fn with_series(mut self, ticker: impl Into<String>, returns: Vec<f64>) -> Self {
        self.series.insert(ticker.into(), returns);
        self
    }

    pub fn period(&self) -> Period {
        self.period
    }
}

impl ReturnSource for InMemorySource {
    fn fetch_returns(
        &self,
        ticker: &str,
        period: Period,
        lookback: Option<usize>,
    ) -> Result<Vec<f64>> {
        if period != self.period {
            return Err(FrontierError::AssetFetch {
                ticker: ticker.to_string(),
                reason: format!("series are sampled in {}, requested {}", self.period, period),
            });
        }

        let series = self.series.get(ticker).ok_or_else(|| FrontierError::AssetFetch {
            ticker: ticker.to_string(),
            reason: "unknown ticker".into(),
        })?;

        let start = match lookback {
            Some(n) => series.len().saturating_sub(n),
            None => 0,
        };
        Ok(series[start..].to_vec())
    }
}

/// Fetch every ticker of the universe and assemble a time-aligned return matrix.
pub fn load_return_matrix<S: ReturnSource + ?Sized>(
    source: &S,
    universe: &AssetUniverse,
    period: Period,
    lookback: Option<usize>,
) -> Result<ReturnMatrix> {
    let mut columns = Vec::with_capacity(universe.len());
    for ticker in universe.tickers() {
        let col = source.fetch_returns(ticker, period, lookback)?;
        debug!(ticker = %ticker, periods = col.len(), "fetched returns");
        columns.push(col);
    }

    let expected = columns[0].len();
    if let Some((j, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != expected) {
        return Err(FrontierError::InvalidData(format!(
            "return series are not time-aligned: '{}' has {} periods, '{}' has {}",
            universe.tickers()[0],
            expected,
            universe.tickers()[j],
            col.len()
        )));
    }

    ReturnMatrix::from_columns(columns)
}
