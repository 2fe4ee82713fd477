//! Error types for the vitals_forecast crate

use thiserror::Error;
use vitals_math::MathError;

/// Custom error types for the vitals_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No aggregated buckets were left to forecast from
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An ensemble was requested but no member method produced output
    #[error("No forecasting methods produced output")]
    NoMethodsAvailable,

    /// Error from invalid request or configuration parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numeric helpers
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error parsing a sample timestamp
    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading CSV samples
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or writing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
