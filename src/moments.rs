//! Sample moments of a return matrix.
//!
//! The mean vector is the arithmetic mean of each column and the covariance
//! is the unbiased sample covariance (divisor T - 1).

use nalgebra::{DMatrix, DVector};

use crate::data::{Period, ReturnMatrix};
use crate::error::{FrontierError, Result};

/// Relative tolerance for the symmetry check on user-supplied covariances.
const SYMMETRY_TOL: f64 = 1e-12;

/// Expected returns and covariance of a set of assets.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments {
    /// Mean return per asset (length n).
    pub mean: DVector<f64>,
    /// Covariance of returns (n x n, symmetric).
    pub covariance: DMatrix<f64>,
}

impl Moments {
    /// Create from fixed moments, checking shape, finiteness and symmetry.
    pub fn new(mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        let n = mean.len();
        if covariance.nrows() != n || covariance.ncols() != n {
            return Err(FrontierError::shape(
                format!("{}x{} covariance", n, n),
                format!("{}x{}", covariance.nrows(), covariance.ncols()),
            ));
        }
        if mean.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
            return Err(FrontierError::InvalidData(
                "moments contain non-finite values".into(),
            ));
        }

        let scale = covariance.amax().max(1.0);
        for i in 0..n {
            for j in (i + 1)..n {
                if (covariance[(i, j)] - covariance[(j, i)]).abs() > SYMMETRY_TOL * scale {
                    return Err(FrontierError::InvalidData(format!(
                        "covariance is not symmetric at ({}, {})",
                        i, j
                    )));
                }
            }
        }

        Ok(Moments { mean, covariance })
    }

    /// Number of assets.
    pub fn assets(&self) -> usize {
        self.mean.len()
    }

    /// Expected portfolio return μᵗw.
    pub fn portfolio_return(&self, weights: &DVector<f64>) -> f64 {
        self.mean.dot(weights)
    }

    /// Portfolio variance wᵗΣw.
    pub fn portfolio_variance(&self, weights: &DVector<f64>) -> f64 {
        weights.dot(&(&self.covariance * weights))
    }

    /// Portfolio standard deviation. Tiny negative variances from rounding read as zero.
    pub fn portfolio_std_dev(&self, weights: &DVector<f64>) -> f64 {
        self.portfolio_variance(weights).max(0.0).sqrt()
    }

    /// Scale per-period moments to annual figures.
    pub fn annualized(&self, period: Period) -> Moments {
        let k = period.periods_per_year();
        Moments {
            mean: &self.mean * k,
            covariance: &self.covariance * k,
        }
    }
}

/// Estimate mean vector and sample covariance from periodic returns.
///
/// # Errors
///
/// - `InsufficientData` when fewer than two periods are present
/// - `InvalidData` when any entry is NaN or infinite
pub fn estimate_moments(returns: &ReturnMatrix) -> Result<Moments> {
    let data = returns.as_matrix();
    let (t, n) = data.shape();

    if t < 2 {
        return Err(FrontierError::InsufficientData { periods: t });
    }
    if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
        // nalgebra storage is column-major
        return Err(FrontierError::InvalidData(format!(
            "non-finite return at period {}, asset {}",
            idx % t,
            idx / t
        )));
    }

    let mean = DVector::from_fn(n, |j, _| data.column(j).mean());

    let mut centered = data.clone();
    for j in 0..n {
        let mu = mean[j];
        centered.column_mut(j).add_scalar_mut(-mu);
    }
    let mut covariance = centered.tr_mul(&centered) / (t as f64 - 1.0);

    // Force exact symmetry; the product above is symmetric only up to rounding.
    for i in 0..n {
        for j in (i + 1)..n {
            let v = 0.5 * (covariance[(i, j)] + covariance[(j, i)]);
            covariance[(i, j)] = v;
            covariance[(j, i)] = v;
        }
    }

    Ok(Moments { mean, covariance })
}
