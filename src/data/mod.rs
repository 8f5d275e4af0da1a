//! Return data entering the core.
//!
//! This module provides:
//! - `ReturnMatrix`, the time-aligned T x n matrix of periodic returns
//! - The `ReturnSource` boundary behind which price fetching and resampling live

pub mod returns;
pub mod source;

pub use returns::ReturnMatrix;
pub use source::{load_return_matrix, InMemorySource, Period, ReturnSource};
