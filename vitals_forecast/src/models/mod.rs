//! Forecasting models for aggregated health-metric series

use crate::data::AggregatedSeries;
use crate::error::{ForecastError, Result};
use crate::intervals::ConfidenceBound;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use vitals_math::AccuracyMetrics;

pub mod autoregressive;
pub mod ensemble;
pub mod linear;
pub mod seasonal;

/// Forecasting method selectable by callers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// Least-squares straight line
    #[default]
    Linear,
    /// Differenced autoregression ("ARIMA-like")
    Autoregressive,
    /// Trend plus periodic component ("Prophet-like")
    Seasonal,
    /// Equal-weight mean of the three methods above
    Ensemble,
}

impl ForecastMethod {
    /// The individual methods an ensemble is built from
    pub const MEMBERS: [ForecastMethod; 3] = [
        ForecastMethod::Linear,
        ForecastMethod::Autoregressive,
        ForecastMethod::Seasonal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ForecastMethod::Linear => "linear",
            ForecastMethod::Autoregressive => "autoregressive",
            ForecastMethod::Seasonal => "seasonal",
            ForecastMethod::Ensemble => "ensemble",
        }
    }
}

impl FromStr for ForecastMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(ForecastMethod::Linear),
            "autoregressive" | "arima" => Ok(ForecastMethod::Autoregressive),
            "seasonal" | "prophet" => Ok(ForecastMethod::Seasonal),
            "ensemble" => Ok(ForecastMethod::Ensemble),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown forecasting method '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forecast produced by one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodForecast {
    /// Method that produced the values
    pub method: ForecastMethod,
    /// `values[i]` is the i-th bucket after the last aggregated point
    pub values: Vec<f64>,
    /// Heuristic uncertainty band, one bound per value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<Vec<ConfidenceBound>>,
    /// In-sample accuracy of the method's fitted values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<AccuracyMetrics>,
}

impl MethodForecast {
    pub fn new(method: ForecastMethod, values: Vec<f64>) -> Self {
        Self {
            method,
            values,
            confidence_interval: None,
            fit: None,
        }
    }

    /// Attach a confidence interval, which must match the forecast length
    pub fn with_interval(mut self, interval: Vec<ConfidenceBound>) -> Result<Self> {
        if interval.len() != self.horizon() {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval length ({}) doesn't match forecast length ({})",
                interval.len(),
                self.horizon()
            )));
        }
        self.confidence_interval = Some(interval);
        Ok(self)
    }

    pub fn with_fit(mut self, fit: Option<AccuracyMetrics>) -> Self {
        self.fit = fit;
        self
    }

    /// Number of forecast buckets
    pub fn horizon(&self) -> usize {
        self.values.len()
    }
}

/// A model fitted to one series
pub trait TrainedForecastModel: Debug + Send {
    /// Generate values for the `horizon` buckets after the history
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// In-sample fitted values, aligned with the tail of the history
    fn fitted(&self) -> &[f64];

    /// Actual minus fitted over the same tail
    fn residuals(&self) -> &[f64];

    /// Method this model implements
    fn method(&self) -> ForecastMethod;
}

/// Forecast model that can be trained on an aggregated series
pub trait ForecastModel: Debug + Clone + Sync {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model; every call refits from scratch
    fn train(&self, series: &AggregatedSeries) -> Result<Self::Trained>;

    /// Method this model implements
    fn method(&self) -> ForecastMethod;
}

/// Residuals of `fitted` against the matching tail of `actual`
pub(crate) fn tail_residuals(actual: &[f64], fitted: &[f64]) -> Vec<f64> {
    let offset = actual.len().saturating_sub(fitted.len());
    actual[offset..]
        .iter()
        .zip(fitted)
        .map(|(a, f)| a - f)
        .collect()
}

pub(crate) fn require_history(series: &AggregatedSeries) -> Result<Vec<f64>> {
    if series.is_empty() {
        return Err(ForecastError::InsufficientData(
            "Cannot train on an empty series".to_string(),
        ));
    }
    Ok(series.values())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("linear".parse::<ForecastMethod>().unwrap(), ForecastMethod::Linear);
        assert_eq!(
            " ARIMA ".parse::<ForecastMethod>().unwrap(),
            ForecastMethod::Autoregressive
        );
        assert_eq!(
            "prophet".parse::<ForecastMethod>().unwrap(),
            ForecastMethod::Seasonal
        );
        assert!(matches!(
            "neural".parse::<ForecastMethod>(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_with_interval_length_checked() {
        let forecast = MethodForecast::new(ForecastMethod::Linear, vec![1.0, 2.0]);
        let bound = ConfidenceBound { lower: 0.0, upper: 1.0 };
        assert!(forecast.clone().with_interval(vec![bound]).is_err());
        assert!(forecast.with_interval(vec![bound, bound]).is_ok());
    }

    #[test]
    fn test_tail_residuals_alignment() {
        let residuals = tail_residuals(&[1.0, 2.0, 4.0, 7.0], &[3.0, 6.0]);
        assert_eq!(residuals, vec![1.0, 1.0]);
    }
}
