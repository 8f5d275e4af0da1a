//! Efficient Frontier Example
//!
//! This example traces a long-only Markowitz frontier:
//!
//! minimize    w' Σ w                (minimize risk)
//! subject to  μ' w == target        (target return)
//!             sum(w) = 1            (fully invested)
//!             w >= 0                (long-only)
//!
//! for targets from the minimum-variance return up to the best asset's mean.
//!
//! Run with `RUST_LOG=markowitz=debug` to see per-target solver output.

use markowitz::prelude::*;
use nalgebra::{DMatrix, DVector};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Efficient Frontier ===\n");

    let universe = AssetUniverse::new(["A", "B", "C", "D"])?;

    // 4 assets with different risk/return profiles
    let mu = DVector::from_vec(vec![0.12, 0.10, 0.07, 0.05]);

    #[rustfmt::skip]
    let sigma = DMatrix::from_row_slice(4, 4, &[
         0.04,  0.01,  0.00, -0.01,
         0.01,  0.03,  0.00,  0.00,
         0.00,  0.00,  0.02,  0.00,
        -0.01,  0.00,  0.00,  0.01,
    ]);
    let moments = Moments::new(mu, sigma)?;

    let config = FrontierConfig::default()
        .with_increment(12)
        .with_risk_free_rate(0.02);
    let frontier = FrontierBuilder::new(config).compute_from_moments(&universe, &moments)?;

    if let Some(gmv) = frontier.min_variance() {
        println!("Minimum-variance portfolio:");
        println!("  Return: {:.2}%  Risk: {:.2}%", gmv.expected_return * 100.0, gmv.std_dev * 100.0);
        println!("  Weights: {}\n", format_weights(frontier.tickers(), &gmv.weights));
    }

    let table = frontier.to_table();
    println!("{}", table.columns.join("\t"));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
        println!("{}", cells.join("\t"));
    }

    if let Some(best) = frontier.max_sharpe() {
        println!(
            "\nHighest Sharpe ratio on the grid: {:.4} at {:.2}% return",
            best.sharpe_ratio.unwrap_or(f64::NAN),
            best.target_return * 100.0
        );
        println!("  Weights: {}", format_weights(frontier.tickers(), &best.weights));
    }

    // Targets outside [min μ, max μ] cannot be reached without short sales.
    let strict = FrontierBuilder::new(
        FrontierConfig::default().with_grid(TargetGrid::Explicit { targets: vec![0.09, 0.15] }),
    );
    match strict.compute_from_moments(&universe, &moments) {
        Ok(_) => println!("\nUnexpectedly solved an unreachable target"),
        Err(e) => println!("\nFail-fast run stopped: {}", e),
    }

    Ok(())
}

fn format_weights(tickers: &[String], weights: &[f64]) -> String {
    tickers
        .iter()
        .zip(weights)
        .map(|(t, w)| format!("{} {:.1}%", t, w * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}
