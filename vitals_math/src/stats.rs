//! Summary statistics and series transforms

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Arithmetic mean of `values`
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of `values`.
///
/// Empty input, a single value and non-finite results all yield `0.0`.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sigma = values.iter().population_std_dev();
    if sigma.is_finite() {
        sigma
    } else {
        0.0
    }
}

/// First differences `d[i] = y[i + 1] - y[i]`
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Rebuild levels from differences, starting after `start`
pub fn integrate(start: f64, differences: &[f64]) -> Vec<f64> {
    differences
        .iter()
        .scan(start, |level, d| {
            *level += d;
            Some(*level)
        })
        .collect()
}
