//! Additive trend + seasonal decomposition ("Prophet-like")
//!
//! The series is split into a least-squares trend, a periodic component
//! keyed by `position mod period`, and a residual. The periodic component
//! is only estimated once the history covers two full periods; before
//! that it is zero and the forecast reduces to the trend.

use crate::data::AggregatedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    require_history, tail_residuals, ForecastMethod, ForecastModel, TrainedForecastModel,
};
use tracing::debug;
use vitals_math::LinearFit;

/// Seasonal decomposition model
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    /// Period length in buckets
    period: usize,
}

/// Trained seasonal decomposition
#[derive(Debug, Clone)]
pub struct TrainedSeasonalDecomposition {
    period: usize,
    trend: LinearFit,
    /// Mean deviation from trend per position in the period
    seasonal: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl SeasonalDecomposition {
    /// Create a model with the given period (at least 2 buckets)
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonal period must be at least 2, got {}",
                period
            )));
        }
        Ok(Self { period })
    }
}

impl ForecastModel for SeasonalDecomposition {
    type Trained = TrainedSeasonalDecomposition;

    fn train(&self, series: &AggregatedSeries) -> Result<TrainedSeasonalDecomposition> {
        let values = require_history(series)?;
        let trend = LinearFit::fit(&values)?;
        let trend_values = trend.fitted();

        let seasonal = if values.len() >= 2 * self.period {
            let mut sums = vec![0.0; self.period];
            let mut counts = vec![0usize; self.period];
            for (i, (y, t)) in values.iter().zip(&trend_values).enumerate() {
                sums[i % self.period] += y - t;
                counts[i % self.period] += 1;
            }
            sums.iter()
                .zip(&counts)
                .map(|(s, &c)| s / c as f64)
                .collect()
        } else {
            debug!(
                points = values.len(),
                period = self.period,
                "History shorter than two periods, seasonal component is zero"
            );
            vec![0.0; self.period]
        };

        let fitted: Vec<f64> = trend_values
            .iter()
            .enumerate()
            .map(|(i, t)| t + seasonal[i % self.period])
            .collect();
        let residuals = tail_residuals(&values, &fitted);

        Ok(TrainedSeasonalDecomposition {
            period: self.period,
            trend,
            seasonal,
            fitted,
            residuals,
        })
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Seasonal
    }
}

impl TrainedSeasonalDecomposition {
    /// Seasonal offsets indexed by position within the period
    pub fn seasonal_component(&self) -> &[f64] {
        &self.seasonal
    }
}

impl TrainedForecastModel for TrainedSeasonalDecomposition {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let n = self.trend.len();
        Ok((n..n + horizon)
            .map(|x| self.trend.value_at(x as f64) + self.seasonal[x % self.period])
            .collect())
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Seasonal
    }
}
