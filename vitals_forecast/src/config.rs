//! Tunable constants of the forecasting engine

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine configuration.
///
/// Every field has a default, so a JSON file only needs to list the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Multiplier applied to the residual standard deviation for band width
    pub interval_multiplier: f64,
    /// Seasonal period in buckets; `None` uses the granularity default
    pub seasonal_period: Option<usize>,
    /// Percent change beyond which a trend counts as up or down
    pub direction_threshold_pct: f64,
    /// Relative band width below which certainty is high
    pub high_certainty_width: f64,
    /// Relative band width below which certainty is medium
    pub medium_certainty_width: f64,
    /// Largest accepted horizon
    pub max_horizon: usize,
    /// Largest accepted history window in days
    pub max_days_analyzed: u32,
    /// Fit ensemble members on the rayon pool
    pub parallel: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            interval_multiplier: 1.0,
            seasonal_period: None,
            direction_threshold_pct: 1.0,
            high_certainty_width: 0.1,
            medium_certainty_width: 0.3,
            max_horizon: 365,
            max_days_analyzed: 366,
            parallel: true,
        }
    }
}

impl ForecastConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file written as JSON
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the values are usable
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_multiplier.is_finite() && self.interval_multiplier > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_multiplier must be positive, got {}",
                self.interval_multiplier
            )));
        }
        if !(self.direction_threshold_pct.is_finite() && self.direction_threshold_pct >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "direction_threshold_pct must be non-negative, got {}",
                self.direction_threshold_pct
            )));
        }
        if !(self.high_certainty_width > 0.0
            && self.high_certainty_width < self.medium_certainty_width)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "certainty widths must satisfy 0 < high ({}) < medium ({})",
                self.high_certainty_width, self.medium_certainty_width
            )));
        }
        if let Some(period) = self.seasonal_period {
            if period < 2 {
                return Err(ForecastError::InvalidParameter(format!(
                    "seasonal_period must be at least 2, got {}",
                    period
                )));
            }
        }
        if self.max_horizon == 0 || self.max_days_analyzed == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_horizon and max_days_analyzed must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
