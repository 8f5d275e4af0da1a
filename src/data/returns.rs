//! Periodic return matrix.

use nalgebra::{DMatrix, DVector};

use crate::error::{FrontierError, Result};

/// T periods x n assets of periodic returns.
///
/// Rows are periods, columns are assets in universe order. Values are not
/// validated here; the moment estimator rejects non-finite entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    data: DMatrix<f64>,
}

impl ReturnMatrix {
    /// Wrap an existing T x n matrix.
    pub fn new(data: DMatrix<f64>) -> Self {
        ReturnMatrix { data }
    }

    /// Build from one return series per asset. All columns must have the same length.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        let periods = columns.first().map(Vec::len).unwrap_or(0);
        for (j, col) in columns.iter().enumerate() {
            if col.len() != periods {
                return Err(FrontierError::shape(
                    format!("{} periods in column {}", periods, j),
                    format!("{}", col.len()),
                ));
            }
        }

        let n = columns.len();
        let data = DMatrix::from_fn(periods, n, |i, j| columns[j][i]);
        Ok(ReturnMatrix { data })
    }

    /// Build from row-major data: one row per period.
    pub fn from_rows(periods: usize, assets: usize, values: &[f64]) -> Result<Self> {
        if values.len() != periods * assets {
            return Err(FrontierError::shape(
                format!("{} values ({} x {})", periods * assets, periods, assets),
                format!("{}", values.len()),
            ));
        }
        Ok(ReturnMatrix {
            data: DMatrix::from_row_slice(periods, assets, values),
        })
    }

    /// Number of periods (rows).
    pub fn periods(&self) -> usize {
        self.data.nrows()
    }

    /// Number of assets (columns).
    pub fn assets(&self) -> usize {
        self.data.ncols()
    }

    /// Return series of one asset.
    pub fn column(&self, j: usize) -> Option<DVector<f64>> {
        (j < self.assets()).then(|| self.data.column(j).into_owned())
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

impl From<DMatrix<f64>> for ReturnMatrix {
    fn from(data: DMatrix<f64>) -> Self {
        ReturnMatrix::new(data)
    }
}
