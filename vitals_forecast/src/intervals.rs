//! Heuristic uncertainty bands for forecasts
//!
//! The band half-width at step `i` (0-indexed) is
//! `multiplier * sigma * sqrt(1 + i)`, where `sigma` is the population
//! standard deviation of the method's in-sample residuals. This is an
//! illustrative band that widens with distance; it is not a calibrated
//! prediction interval and carries no coverage guarantee.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use vitals_math::population_std_dev;

/// Lower and upper edge of the band at one forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBound {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceBound {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Builds widening bands from residual spread
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceIntervalEstimator {
    multiplier: f64,
}

impl Default for ConfidenceIntervalEstimator {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl ConfidenceIntervalEstimator {
    /// Create an estimator with a positive band multiplier
    pub fn new(multiplier: f64) -> Result<Self> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval multiplier must be positive, got {}",
                multiplier
            )));
        }
        Ok(Self { multiplier })
    }

    /// Half-width of the band `step` buckets ahead for a residual spread `sigma`
    pub fn half_width(&self, sigma: f64, step: usize) -> f64 {
        self.multiplier * sigma * ((1 + step) as f64).sqrt()
    }

    /// Band around `values` from the method's in-sample `residuals`.
    ///
    /// Empty or constant residuals give a zero-width band.
    pub fn estimate(&self, values: &[f64], residuals: &[f64]) -> Vec<ConfidenceBound> {
        let sigma = population_std_dev(residuals);
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let hw = self.half_width(sigma, i);
                ConfidenceBound {
                    lower: v - hw,
                    upper: v + hw,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_band_widens_with_horizon() {
        let estimator = ConfidenceIntervalEstimator::default();
        let band = estimator.estimate(&[100.0, 100.0, 100.0, 100.0], &[-2.0, 2.0, -2.0, 2.0]);

        // sigma = 2
        assert_relative_eq!(band[0].width(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(band[3].width(), 8.0, epsilon = 1e-12);
        for pair in band.windows(2) {
            assert!(pair[1].width() >= pair[0].width());
        }
    }

    #[test]
    fn test_zero_spread_gives_zero_width() {
        let estimator = ConfidenceIntervalEstimator::default();
        for residuals in [&[][..], &[0.5, 0.5, 0.5][..]] {
            let band = estimator.estimate(&[70.0, 71.0], residuals);
            assert!(band.iter().all(|b| b.width() == 0.0));
            assert_eq!(band[1].lower, 71.0);
        }
    }

    #[test]
    fn test_multiplier_scales_band() {
        let estimator = ConfidenceIntervalEstimator::new(2.0).unwrap();
        let band = estimator.estimate(&[10.0], &[1.0, -1.0]);
        assert_relative_eq!(band[0].lower, 8.0);
        assert_relative_eq!(band[0].upper, 12.0);
        assert!(ConfidenceIntervalEstimator::new(0.0).is_err());
    }
}
