//! Linear trend projection

use crate::data::AggregatedSeries;
use crate::error::Result;
use crate::models::{
    require_history, tail_residuals, ForecastMethod, ForecastModel, TrainedForecastModel,
};
use tracing::debug;
use vitals_math::LinearFit;

/// Ordinary least-squares trend over bucket positions
#[derive(Debug, Clone, Default)]
pub struct LinearTrend;

/// Trained linear trend model
#[derive(Debug, Clone)]
pub struct TrainedLinearTrend {
    /// Fitted line
    line: LinearFit,
    /// Line values at every historical position
    fitted: Vec<f64>,
    /// Residuals from fitting
    residuals: Vec<f64>,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastModel for LinearTrend {
    type Trained = TrainedLinearTrend;

    fn train(&self, series: &AggregatedSeries) -> Result<TrainedLinearTrend> {
        let values = require_history(series)?;
        let line = LinearFit::fit(&values)?;
        let fitted = line.fitted();
        let residuals = tail_residuals(&values, &fitted);
        debug!(
            slope = line.slope(),
            intercept = line.intercept(),
            r_squared = ?line.r_squared(&values),
            "Fitted linear trend"
        );

        Ok(TrainedLinearTrend {
            line,
            fitted,
            residuals,
        })
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Linear
    }
}

impl TrainedLinearTrend {
    /// Change per bucket
    pub fn slope(&self) -> f64 {
        self.line.slope()
    }
}

impl TrainedForecastModel for TrainedLinearTrend {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(self.line.project(horizon))
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Granularity;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn series(values: &[f64]) -> AggregatedSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        AggregatedSeries::from_values(start, Granularity::Day, values)
    }

    #[test]
    fn test_projects_slope() {
        let trained = LinearTrend::new()
            .train(&series(&[100.0, 102.0, 104.0, 106.0, 108.0]))
            .unwrap();
        let values = trained.forecast(2).unwrap();

        assert_relative_eq!(trained.slope(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(values[0], 110.0, epsilon = 1e-9);
        assert_relative_eq!(values[1], 112.0, epsilon = 1e-9);
        assert!(trained.residuals().iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn test_single_point_is_flat() {
        let trained = LinearTrend::new().train(&series(&[88.0])).unwrap();
        assert_eq!(trained.forecast(3).unwrap(), vec![88.0, 88.0, 88.0]);
        assert_eq!(trained.slope(), 0.0);
    }

    #[test]
    fn test_empty_series_fails() {
        assert!(LinearTrend::new().train(&AggregatedSeries::default()).is_err());
    }
}
