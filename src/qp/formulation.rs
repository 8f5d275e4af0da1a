//! Constraint encoding for the minimum-variance problem.
//!
//! For a target return `r` the portfolio problem
//!
//! ```text
//! minimize    wᵗΣw
//! subject to  1ᵗw = 1        (budget)
//!             μᵗw = r        (target return)
//!             w  >= 0        (no short sales, optional)
//! ```
//!
//! is written in the form `min ½wᵗDw − dᵗw  s.t.  Aᵗw (=|>=) b` with
//! `D = 2Σ` and `d = 0`. The columns of `A` are the constraints: equalities
//! first (`meq` of them), then one identity column per asset for `w_i >= 0`.

use nalgebra::{DMatrix, DVector};

use crate::error::{FrontierError, Result};
use crate::moments::Moments;

/// Relative slack allowed when screening targets against the reachable range.
const REACH_TOL: f64 = 1e-12;

/// A quadratic program in quadprog form.
#[derive(Debug, Clone, PartialEq)]
pub struct QpProblem {
    /// Quadratic term D (n x n).
    pub dmat: DMatrix<f64>,
    /// Linear term d (n).
    pub dvec: DVector<f64>,
    /// Constraint matrix A (n x m), one column per constraint.
    pub amat: DMatrix<f64>,
    /// Constraint bounds b (m).
    pub bvec: DVector<f64>,
    /// Number of leading columns of A that are equalities.
    pub meq: usize,
    /// Target return encoded in the problem, if any.
    pub target: Option<f64>,
}

impl QpProblem {
    /// Number of decision variables.
    pub fn num_vars(&self) -> usize {
        self.dmat.nrows()
    }

    /// Number of constraints (columns of A).
    pub fn num_constraints(&self) -> usize {
        self.amat.ncols()
    }

    /// Number of inequality constraints.
    pub fn num_inequalities(&self) -> usize {
        self.num_constraints() - self.meq
    }

    /// Check that D, d, A, b and meq agree with each other.
    pub fn check_dimensions(&self) -> Result<()> {
        let n = self.dmat.nrows();
        if self.dmat.ncols() != n {
            return Err(FrontierError::shape(
                "square D",
                format!("{}x{}", n, self.dmat.ncols()),
            ));
        }
        if self.dvec.len() != n {
            return Err(FrontierError::shape(format!("d of length {}", n), self.dvec.len().to_string()));
        }
        if self.amat.nrows() != n {
            return Err(FrontierError::shape(
                format!("A with {} rows", n),
                self.amat.nrows().to_string(),
            ));
        }
        if self.bvec.len() != self.amat.ncols() {
            return Err(FrontierError::shape(
                format!("b of length {}", self.amat.ncols()),
                self.bvec.len().to_string(),
            ));
        }
        if self.meq > self.amat.ncols() {
            return Err(FrontierError::shape(
                format!("meq <= {}", self.amat.ncols()),
                self.meq.to_string(),
            ));
        }
        Ok(())
    }

    /// Largest violation of any constraint at `w`.
    pub fn max_violation(&self, w: &DVector<f64>) -> f64 {
        let lhs = self.amat.tr_mul(w);
        lhs.iter()
            .zip(self.bvec.iter())
            .enumerate()
            .map(|(j, (l, b))| if j < self.meq { (l - b).abs() } else { (b - l).max(0.0) })
            .fold(0.0, f64::max)
    }

    /// Range of `μᵗw` over fully invested long-only portfolios, when the
    /// problem has the layout built by [`formulate`] with `long_only`.
    ///
    /// Returns `None` for problems without a target, with short sales
    /// allowed, or with any other constraint layout.
    pub fn target_range(&self) -> Option<(f64, f64)> {
        let n = self.num_vars();
        if self.target.is_none() || self.meq != 2 || n == 0 || self.num_inequalities() != n {
            return None;
        }
        if self.check_dimensions().is_err() {
            return None;
        }
        let budget = self.bvec[0] == 1.0 && self.amat.column(0).iter().all(|v| *v == 1.0);
        let nonneg = self.amat.columns(self.meq, n) == DMatrix::<f64>::identity(n, n)
            && self.bvec.rows(self.meq, n).iter().all(|b| *b == 0.0);
        if !(budget && nonneg) {
            return None;
        }
        let mu = self.amat.column(1);
        Some((mu.min(), mu.max()))
    }
}

/// Encode the minimum-variance problem for one target return.
///
/// Column 1 of A is the budget (`1ᵗw = 1`), column 2 the target
/// (`μᵗw = target`), and with `long_only` the remaining n columns are the
/// identity (`w >= 0`). `meq` is 2.
pub fn formulate(moments: &Moments, target: f64, long_only: bool) -> Result<QpProblem> {
    if !target.is_finite() {
        return Err(FrontierError::InvalidData(format!(
            "target return must be finite, got {}",
            target
        )));
    }
    build(moments, Some(target), long_only)
}

/// Encode the global minimum-variance problem: budget and optional
/// non-negativity only, no target return (`meq = 1`).
pub fn formulate_min_variance(moments: &Moments, long_only: bool) -> Result<QpProblem> {
    build(moments, None, long_only)
}

fn build(moments: &Moments, target: Option<f64>, long_only: bool) -> Result<QpProblem> {
    let n = moments.assets();
    if moments.covariance.shape() != (n, n) {
        return Err(FrontierError::shape(
            format!("{}x{} covariance", n, n),
            format!("{}x{}", moments.covariance.nrows(), moments.covariance.ncols()),
        ));
    }

    let meq = if target.is_some() { 2 } else { 1 };
    let m = meq + if long_only { n } else { 0 };

    let mut amat = DMatrix::zeros(n, m);
    let mut bvec = DVector::zeros(m);

    amat.column_mut(0).fill(1.0);
    bvec[0] = 1.0;

    if let Some(r) = target {
        amat.column_mut(1).copy_from(&moments.mean);
        bvec[1] = r;
    }

    if long_only {
        for i in 0..n {
            amat[(i, meq + i)] = 1.0;
        }
    }

    Ok(QpProblem {
        dmat: &moments.covariance * 2.0,
        dvec: DVector::zeros(n),
        amat,
        bvec,
        meq,
        target,
    })
}

/// Range of target returns a fully invested portfolio can reach.
///
/// With no short sales this is `[min μ, max μ]`; otherwise any return is
/// reachable and `None` is returned.
pub fn reachable_returns(moments: &Moments, long_only: bool) -> Option<(f64, f64)> {
    (long_only && moments.assets() > 0).then(|| (moments.mean.min(), moments.mean.max()))
}

/// Fail with `InfeasibleConstraints` if `target` lies outside the long-only
/// range `(lo, hi)` by more than rounding.
pub fn check_reachable(target: f64, (lo, hi): (f64, f64)) -> Result<()> {
    let slack = REACH_TOL * (1.0 + lo.abs().max(hi.abs()));
    if target > hi + slack {
        return Err(FrontierError::InfeasibleConstraints {
            target,
            reason: format!(
                "exceeds the largest mean return {} reachable without short sales",
                hi
            ),
        });
    }
    if target < lo - slack {
        return Err(FrontierError::InfeasibleConstraints {
            target,
            reason: format!(
                "is below the smallest mean return {} reachable without short sales",
                lo
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moments() -> Moments {
        Moments::new(
            DVector::from_vec(vec![0.01, 0.02, 0.03]),
            DMatrix::from_row_slice(3, 3, &[0.04, 0.01, 0.0, 0.01, 0.03, 0.0, 0.0, 0.0, 0.02]),
        )
        .unwrap()
    }

    #[test]
    fn test_formulate_long_only() {
        let qp = formulate(&moments(), 0.015, true).unwrap();
        qp.check_dimensions().unwrap();

        assert_eq!(qp.meq, 2);
        assert_eq!(qp.num_constraints(), 5);
        assert_eq!(qp.num_inequalities(), 3);
        assert_eq!(qp.dmat[(0, 0)], 0.08);
        assert_eq!(qp.dmat[(0, 1)], 0.02);
        assert!(qp.dvec.iter().all(|v| *v == 0.0));

        // budget
        assert!(qp.amat.column(0).iter().all(|v| *v == 1.0));
        assert_eq!(qp.bvec[0], 1.0);
        // target
        assert_eq!(qp.amat.column(1).as_slice(), &[0.01, 0.02, 0.03]);
        assert_eq!(qp.bvec[1], 0.015);
        // identity block
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(qp.amat[(i, 2 + j)], expected);
            }
            assert_eq!(qp.bvec[2 + i], 0.0);
        }
        assert_eq!(qp.target, Some(0.015));
    }

    #[test]
    fn test_formulate_with_shorting() {
        let qp = formulate(&moments(), 0.05, false).unwrap();
        assert_eq!(qp.num_constraints(), 2);
        assert_eq!(qp.meq, 2);
        assert_eq!(qp.num_inequalities(), 0);
    }

    #[test]
    fn test_formulate_min_variance() {
        let qp = formulate_min_variance(&moments(), true).unwrap();
        assert_eq!(qp.meq, 1);
        assert_eq!(qp.num_constraints(), 4);
        assert_eq!(qp.target, None);
        assert_eq!(qp.amat[(1, 2)], 1.0);
    }

    #[test]
    fn test_non_finite_target() {
        assert!(matches!(
            formulate(&moments(), f64::NAN, true),
            Err(FrontierError::InvalidData(_))
        ));
    }

    #[test]
    fn test_max_violation() {
        let qp = formulate(&moments(), 0.02, true).unwrap();
        let feasible = DVector::from_vec(vec![0.5, 0.0, 0.5]);
        assert!(qp.max_violation(&feasible) < 1e-15);

        let short = DVector::from_vec(vec![-0.1, 0.2, 0.9]);
        // return is 0.03 (off by 0.01), the short position of 0.1 dominates
        assert!((qp.max_violation(&short) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_check_dimensions_rejects_bad_meq() {
        let mut qp = formulate(&moments(), 0.02, false).unwrap();
        qp.meq = 3;
        assert!(matches!(qp.check_dimensions(), Err(FrontierError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_target_range() {
        let qp = formulate(&moments(), 0.015, true).unwrap();
        assert_eq!(qp.target_range(), Some((0.01, 0.03)));

        assert_eq!(formulate(&moments(), 0.015, false).unwrap().target_range(), None);
        assert_eq!(formulate_min_variance(&moments(), true).unwrap().target_range(), None);

        let mut upper_bounded = qp.clone();
        upper_bounded.bvec[3] = -0.5;
        assert_eq!(upper_bounded.target_range(), None);
    }

    #[test]
    fn test_check_reachable() {
        assert!(check_reachable(0.03, (0.01, 0.03)).is_ok());
        assert!(check_reachable(0.03 + 1e-15, (0.01, 0.03)).is_ok());
        assert!(matches!(
            check_reachable(0.0300001, (0.01, 0.03)),
            Err(FrontierError::InfeasibleConstraints { target, .. }) if target == 0.0300001
        ));
        assert!(check_reachable(0.0099, (0.01, 0.03)).is_err());
    }

    #[test]
    fn test_reachable_returns() {
        assert_eq!(reachable_returns(&moments(), true), Some((0.01, 0.03)));
        assert_eq!(reachable_returns(&moments(), false), None);
    }
}
