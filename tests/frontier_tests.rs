//! Frontier-level properties.

use approx::assert_abs_diff_eq;
use markowitz::prelude::*;
use nalgebra::{DMatrix, DVector};

const TOL: f64 = 1e-6;

fn four_assets() -> (AssetUniverse, Moments) {
    #[rustfmt::skip]
    let sigma = DMatrix::from_row_slice(4, 4, &[
         0.04,  0.01,  0.00, -0.01,
         0.01,  0.03,  0.00,  0.00,
         0.00,  0.00,  0.02,  0.00,
        -0.01,  0.00,  0.00,  0.01,
    ]);
    let moments =
        Moments::new(DVector::from_vec(vec![0.12, 0.10, 0.07, 0.05]), sigma).expect("valid moments");
    let universe = AssetUniverse::new(["A", "B", "C", "D"]).expect("distinct tickers");
    (universe, moments)
}

/// Deterministic monthly returns for three assets, 48 periods.
fn synthetic_returns() -> ReturnMatrix {
    let t = 48;
    let cols = (0..3)
        .map(|j| {
            let drift = [0.004, 0.007, 0.010][j];
            let scale = [0.01, 0.025, 0.04][j];
            (0..t)
                .map(|i| {
                    let x = i as f64;
                    drift
                        + scale * (0.9 * (j as f64 + 1.0) * x + j as f64).sin()
                        + 0.3 * scale * (1.7 * x / (j as f64 + 1.0)).cos()
                })
                .collect()
        })
        .collect();
    ReturnMatrix::from_columns(cols).expect("aligned")
}

fn achievable_frontier(increment: usize) -> (Moments, Frontier) {
    let (universe, moments) = four_assets();
    let frontier = FrontierBuilder::new(FrontierConfig::default().with_increment(increment))
        .compute_from_moments(&universe, &moments)
        .expect("frontier should solve");
    (moments, frontier)
}

// ============================================================================
// Point invariants
// ============================================================================

#[test]
fn test_weights_sum_to_one() {
    let (_, frontier) = achievable_frontier(25);
    assert_eq!(frontier.len(), 25);
    assert!(frontier.is_complete());

    for p in frontier.points() {
        let sum: f64 = p.weights.iter().sum();
        assert!((sum - 1.0).abs() < TOL, "target {}: weights sum to {}", p.target_return, sum);
    }
}

#[test]
fn test_weights_non_negative() {
    let (_, frontier) = achievable_frontier(25);
    for p in frontier.points() {
        assert!(
            p.weights.iter().all(|w| *w >= 0.0),
            "target {}: negative weight in {:?}",
            p.target_return,
            p.weights
        );
    }
}

#[test]
fn test_std_dev_round_trip() {
    let (moments, frontier) = achievable_frontier(15);
    for p in frontier.points() {
        let w = p.weights_vector();
        let sd = w.dot(&(&moments.covariance * &w)).sqrt();
        assert!(
            (sd - p.std_dev).abs() < 1e-8,
            "target {}: recomputed {} vs reported {}",
            p.target_return,
            sd,
            p.std_dev
        );
    }
}

#[test]
fn test_sharpe_uses_target_and_risk_free_rate() {
    let (universe, moments) = four_assets();
    let rf = 0.02;
    let frontier = FrontierBuilder::new(
        FrontierConfig::default()
            .with_increment(10)
            .with_risk_free_rate(rf),
    )
    .compute_from_moments(&universe, &moments)
    .unwrap();

    for p in frontier.points() {
        let expected = (p.target_return - rf) / p.std_dev;
        assert_abs_diff_eq!(p.sharpe_ratio.unwrap(), expected, epsilon = 1e-12);
    }
    let best = frontier.max_sharpe().expect("has points");
    assert!(frontier.points().all(|p| p.sharpe_ratio <= best.sharpe_ratio));
}

// ============================================================================
// Frontier shape
// ============================================================================

#[test]
fn test_variance_non_decreasing_on_efficient_branch() {
    let (_, frontier) = achievable_frontier(30);
    let points: Vec<_> = frontier.points().collect();

    for pair in points.windows(2) {
        assert!(pair[1].target_return > pair[0].target_return);
        assert!(
            pair[1].std_dev >= pair[0].std_dev - TOL,
            "sd dropped from {} to {} between targets {} and {}",
            pair[0].std_dev,
            pair[1].std_dev,
            pair[0].target_return,
            pair[1].target_return
        );
    }
}

#[test]
fn test_grid_spans_min_variance_to_max_return() {
    let (moments, frontier) = achievable_frontier(20);
    let gmv = frontier.min_variance().expect("min-variance point");
    let first = frontier.points().next().unwrap();
    let last = frontier.points().last().unwrap();

    assert_abs_diff_eq!(first.target_return, gmv.expected_return, epsilon = 1e-12);
    assert!(last.target_return < moments.mean.max());
    assert!(last.target_return > moments.mean.max() - 1e-6);

    // the best asset dominates the top of the frontier
    assert!(last.weights[0] > 0.99, "expected concentration in A, got {:?}", last.weights);
    // nothing on the frontier is less risky than the minimum-variance portfolio
    assert!(frontier.points().all(|p| p.std_dev >= gmv.std_dev - TOL));
}

#[test]
fn test_table_has_n_plus_three_columns() {
    let (_, frontier) = achievable_frontier(5);
    let table = frontier.to_table();
    assert_eq!(table.columns.len(), 4 + 3);
    assert_eq!(table.columns[0], "target_return");
    assert_eq!(table.columns[6], "sharpe_ratio");
    assert_eq!(table.rows.len(), 5);
    assert!(table.rows.iter().all(|r| r.len() == 7));
}

// ============================================================================
// Failure policies
// ============================================================================

#[test]
fn test_fail_fast_reports_first_infeasible_target() {
    let (universe, moments) = four_assets();
    let config = FrontierConfig::default()
        .with_grid(TargetGrid::Explicit { targets: vec![0.08, 0.10, 0.15, 0.20] });

    let err = FrontierBuilder::new(config)
        .compute_from_moments(&universe, &moments)
        .unwrap_err();
    match err {
        FrontierError::InfeasibleConstraints { target, .. } => assert_eq!(target, 0.15),
        other => panic!("expected infeasible at 0.15, got {:?}", other),
    }
}

#[test]
fn test_skip_and_continue_keeps_grid_order() {
    let (universe, moments) = four_assets();
    let config = FrontierConfig::default()
        .with_grid(TargetGrid::Explicit { targets: vec![0.03, 0.08, 0.15, 0.10] })
        .with_failure_policy(FailurePolicy::SkipAndContinue);

    let frontier = FrontierBuilder::new(config)
        .compute_from_moments(&universe, &moments)
        .expect("partial frontier");

    assert_eq!(frontier.len(), 4);
    let targets: Vec<f64> = frontier.entries().iter().map(|e| e.target()).collect();
    assert_eq!(targets, vec![0.03, 0.08, 0.15, 0.10]);

    let failed: Vec<f64> = frontier.failures().map(|f| f.target).collect();
    assert_eq!(failed, vec![0.03, 0.15]);
    assert!(frontier
        .failures()
        .all(|f| matches!(f.error, FrontierError::InfeasibleConstraints { .. })));

    let table = frontier.to_table();
    assert!(table.rows[0][1].is_nan());
    assert!(!table.rows[1][1].is_nan());
}

#[test]
fn test_singular_covariance_aborts_under_any_policy() {
    let moments = Moments::new(
        DVector::from_vec(vec![0.01, 0.02]),
        DMatrix::from_row_slice(2, 2, &[0.02, 0.02, 0.02, 0.02]),
    )
    .unwrap();
    let universe = AssetUniverse::new(["A", "B"]).unwrap();
    let config = FrontierConfig::default().with_failure_policy(FailurePolicy::SkipAndContinue);

    let result = FrontierBuilder::new(config).compute_from_moments(&universe, &moments);
    assert!(matches!(result, Err(FrontierError::SingularCovariance { .. })));
}

// ============================================================================
// Execution modes and entry points
// ============================================================================

#[test]
fn test_parallel_matches_sequential() {
    let (universe, moments) = four_assets();
    let grid = TargetGrid::Linear { min: 0.06, max: 0.11 };
    let sequential = FrontierBuilder::new(
        FrontierConfig::default()
            .with_grid(grid.clone())
            .with_increment(12),
    )
    .compute_from_moments(&universe, &moments)
    .unwrap();
    let parallel = FrontierBuilder::new(
        FrontierConfig::default()
            .with_grid(grid)
            .with_increment(12)
            .with_parallel(true),
    )
    .compute_from_moments(&universe, &moments)
    .unwrap();

    assert_eq!(sequential.len(), parallel.len());
    for (s, p) in sequential.points().zip(parallel.points()) {
        assert_eq!(s.target_return, p.target_return);
        assert_abs_diff_eq!(s.std_dev, p.std_dev, epsilon = 1e-10);
        for (a, b) in s.weights.iter().zip(&p.weights) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_frontier_from_synthetic_returns() {
    let returns = synthetic_returns();
    let universe = AssetUniverse::new(["LOW", "MID", "HIGH"]).unwrap();
    let config = FrontierConfig::default().with_increment(12);
    let frontier = efficient_frontier(&universe, &returns, config).expect("frontier should solve");

    assert_eq!(frontier.len(), 12);
    assert_eq!(frontier.tickers(), universe.tickers());
    for p in frontier.points() {
        assert!((p.weights.iter().sum::<f64>() - 1.0).abs() < TOL);
        assert!(p.weights.iter().all(|w| *w >= 0.0));
    }
}

#[test]
fn test_frontier_from_source_uses_lookback() {
    let returns = synthetic_returns();
    let mut source = InMemorySource::new(Period::Months);
    for (j, ticker) in ["LOW", "MID", "HIGH"].iter().enumerate() {
        let col = returns.column(j).unwrap();
        source = source.with_series(*ticker, col.as_slice().to_vec());
    }
    // an extra, unaligned ticker that the universe does not include
    source = source.with_series("OTHER", vec![0.01, 0.02]);

    let universe = AssetUniverse::new(["LOW", "MID", "HIGH"]).unwrap();
    let config = FrontierConfig::default().with_increment(6).with_lookback(36);
    let frontier = FrontierBuilder::new(config)
        .compute_from_source(&source, &universe)
        .expect("frontier should solve");
    assert_eq!(frontier.len(), 6);

    let wrong_period = FrontierConfig::default().with_period(Period::Weeks);
    let err = FrontierBuilder::new(wrong_period)
        .compute_from_source(&source, &universe)
        .unwrap_err();
    assert!(matches!(err, FrontierError::AssetFetch { .. }));
    assert!(!err.is_solver_failure());
}

#[test]
fn test_residual_cleanup_policy() {
    let (universe, moments) = four_assets();
    let config = FrontierConfig::default()
        .with_increment(8)
        .with_cleaner(CleanerConfig {
            tolerance: 1e-5,
            renormalize: Renormalize::Residual,
        });
    let frontier = FrontierBuilder::new(config)
        .compute_from_moments(&universe, &moments)
        .unwrap();

    // Unallocated mass is reported on the point, not lost.
    for p in frontier.points() {
        let sum: f64 = p.weights.iter().sum();
        assert!((sum + p.residual - 1.0).abs() < 1e-12, "sum {} residual {}", sum, p.residual);
        assert!(p.residual.abs() <= 4.0 * 1e-5 + TOL);
    }
}

#[test]
fn test_residual_policy_reports_clamped_mass() {
    // w1 + w2 = 1 and 0.01 w1 + 0.02 w2 = 0.0199 give w = [0.01, 0.99]
    let moments = Moments::new(
        DVector::from_vec(vec![0.01, 0.02]),
        DMatrix::from_row_slice(2, 2, &[0.02, 0.0, 0.0, 0.03]),
    )
    .unwrap();
    let builder = FrontierBuilder::new(FrontierConfig::default().with_cleaner(CleanerConfig {
        tolerance: 2e-2,
        renormalize: Renormalize::Residual,
    }));
    let point = builder.solve_target(&moments, 0.0199).expect("should solve");

    assert_eq!(point.weights[0], 0.0);
    assert_abs_diff_eq!(point.residual, 0.01, epsilon = 1e-6);
    let sum: f64 = point.weights.iter().sum();
    assert_abs_diff_eq!(sum + point.residual, 1.0, epsilon = 1e-12);

    let json = serde_json::to_value(&point).unwrap();
    assert!(json["residual"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_frontier_serializes() {
    let (_, frontier) = achievable_frontier(3);
    let json = serde_json::to_value(&frontier).unwrap();
    assert_eq!(json["tickers"][0], "A");
    assert_eq!(json["entries"].as_array().unwrap().len(), 3);
    assert_eq!(json["entries"][0]["status"], "solved");
}
