//! Structured trend interpretation of a forecast

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::intervals::ConfidenceBound;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the forecast over its horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// How tight the band is at the end of the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    High,
    Medium,
    Low,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        })
    }
}

impl fmt::Display for Certainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Certainty::High => "high",
            Certainty::Medium => "medium",
            Certainty::Low => "low",
        })
    }
}

/// Presentation-ready summary of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    /// Change from the first to the last forecast value, in percent
    pub percent_change: f64,
    /// Absent when the forecast has no confidence interval
    pub certainty: Option<Certainty>,
}

impl TrendSummary {
    /// English sentence for logs and the CLI
    pub fn describe(&self, metric_type: &str) -> String {
        let movement = match self.direction {
            TrendDirection::Up => format!("is expected to rise by {:.1}%", self.percent_change),
            TrendDirection::Down => {
                format!("is expected to fall by {:.1}%", self.percent_change.abs())
            }
            TrendDirection::Stable => "is expected to stay stable".to_string(),
        };
        match self.certainty {
            Some(certainty) => format!("{} {} ({} certainty)", metric_type, movement, certainty),
            None => format!("{} {}", metric_type, movement),
        }
    }
}

/// Turns forecast values into a [`TrendSummary`]
#[derive(Debug, Clone, Copy)]
pub struct TrendInterpreter {
    direction_threshold_pct: f64,
    high_certainty_width: f64,
    medium_certainty_width: f64,
}

impl Default for TrendInterpreter {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

impl TrendInterpreter {
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            direction_threshold_pct: config.direction_threshold_pct,
            high_certainty_width: config.high_certainty_width,
            medium_certainty_width: config.medium_certainty_width,
        }
    }

    /// Summarise `values`, grading certainty from `interval` when given
    pub fn interpret(
        &self,
        values: &[f64],
        interval: Option<&[ConfidenceBound]>,
    ) -> Result<TrendSummary> {
        let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
            return Err(ForecastError::InvalidParameter(
                "Cannot interpret an empty forecast".to_string(),
            ));
        };

        // A zero starting point has no meaningful relative change
        let percent_change = if first == 0.0 {
            0.0
        } else {
            (last - first) / first.abs() * 100.0
        };

        let direction = if percent_change > self.direction_threshold_pct {
            TrendDirection::Up
        } else if percent_change < -self.direction_threshold_pct {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };

        let certainty = interval
            .and_then(|bounds| bounds.last())
            .map(|bound| self.grade(bound.width(), last));

        Ok(TrendSummary {
            direction,
            percent_change,
            certainty,
        })
    }

    fn grade(&self, width: f64, last: f64) -> Certainty {
        if last == 0.0 {
            return if width == 0.0 {
                Certainty::High
            } else {
                Certainty::Low
            };
        }
        let relative_width = width / last.abs();
        if relative_width < self.high_certainty_width {
            Certainty::High
        } else if relative_width < self.medium_certainty_width {
            Certainty::Medium
        } else {
            Certainty::Low
        }
    }
}
