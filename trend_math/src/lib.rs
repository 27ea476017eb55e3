//! # Trend Math
//!
//! Numeric building blocks for weight trend analysis.
//! This crate fits straight lines to timestamped measurements and evaluates
//! them, keeping the arithmetic well conditioned for epoch-millisecond inputs.

use thiserror::Error;

pub mod regression;

pub use regression::{fit, try_fit, RegressionResult, TimedValue};

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Milliseconds in one week
pub const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// Errors that can occur in trend calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trend math operations
pub type Result<T> = std::result::Result<T, MathError>;
