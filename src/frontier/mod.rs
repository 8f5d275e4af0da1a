//! Efficient frontier construction.
//!
//! This module provides:
//! - `FrontierConfig`, the explicit settings object for a computation
//! - `TargetGrid`, the policy that picks the target returns
//! - `FrontierBuilder`, which solves one QP per target
//! - `Frontier` and `PortfolioPoint`, the typed results

pub mod builder;
pub mod config;
pub mod grid;
pub mod point;

pub use builder::{efficient_frontier, FrontierBuilder};
pub use config::{FailurePolicy, FrontierConfig};
pub use grid::{linspace, TargetGrid};
pub use point::{
    sharpe_ratio, Frontier, FrontierEntry, FrontierTable, PortfolioPoint, TargetFailure,
};
