//! # Vitals Math
//!
//! Numeric building blocks for health-metric forecasting.
//! This crate provides least-squares fitting, differencing, summary
//! statistics and forecast accuracy measures over plain `f64` slices.

use thiserror::Error;

pub mod accuracy;
pub mod regression;
pub mod stats;

pub use accuracy::{forecast_accuracy, AccuracyMetrics};
pub use regression::{solve_least_squares, LinearFit};
pub use stats::{difference, mean, population_std_dev};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
