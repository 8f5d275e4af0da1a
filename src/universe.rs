//! The set of assets a frontier is computed over.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FrontierError, Result};

/// An ordered set of distinct ticker identifiers.
///
/// The order fixes the column order of every [`ReturnMatrix`](crate::ReturnMatrix),
/// mean vector and weight vector derived for this universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AssetUniverse {
    tickers: Vec<String>,
}

impl AssetUniverse {
    /// Create a universe. Requires at least two distinct, non-empty tickers.
    pub fn new<I, S>(tickers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers: Vec<String> = tickers.into_iter().map(Into::into).collect();

        if tickers.len() < 2 {
            return Err(FrontierError::InvalidData(format!(
                "asset universe needs at least 2 tickers, got {}",
                tickers.len()
            )));
        }

        let mut seen = HashSet::with_capacity(tickers.len());
        for ticker in &tickers {
            if ticker.trim().is_empty() {
                return Err(FrontierError::InvalidData("empty ticker in asset universe".into()));
            }
            if !seen.insert(ticker.as_str()) {
                return Err(FrontierError::InvalidData(format!(
                    "duplicate ticker '{}' in asset universe",
                    ticker
                )));
            }
        }

        Ok(AssetUniverse { tickers })
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Always false; a universe holds at least two assets.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Column index of a ticker.
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }
}

impl TryFrom<Vec<String>> for AssetUniverse {
    type Error = FrontierError;

    fn try_from(tickers: Vec<String>) -> Result<Self> {
        AssetUniverse::new(tickers)
    }
}

impl From<AssetUniverse> for Vec<String> {
    fn from(universe: AssetUniverse) -> Self {
        universe.tickers
    }
}
