//! # Vitals Forecast
//!
//! A Rust library for forecasting patient health metrics (heart rate,
//! blood pressure, glucose, ...) from timestamped readings.
//!
//! ## Features
//!
//! - Calendar bucketing of irregular samples (hour, day, week)
//! - Forecasting methods (Linear trend, Autoregressive, Seasonal decomposition)
//! - Equal-weight ensemble of the three methods
//! - Heuristic confidence bands that widen with the horizon
//! - Trend interpretation (direction, percent change, certainty)
//!
//! Every request refits from the supplied history; nothing is cached
//! between calls.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use vitals_forecast::{forecast, ForecastConfig, ForecastMethod, ForecastRequest, Sample};
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
//! let samples: Vec<Sample> = [100.0, 102.0, 104.0, 106.0, 108.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, v)| Sample::new(start + Duration::days(i as i64), *v))
//!     .collect();
//!
//! let request = ForecastRequest::new("glucose", ForecastMethod::Linear).with_horizon(2);
//! let result = forecast(&samples, &request, &ForecastConfig::default())?;
//!
//! assert_eq!(result.primary.values.len(), 2);
//! # Ok::<(), vitals_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod interpretation;
pub mod intervals;
pub mod models;
pub mod orchestrator;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{AggregatedSeries, Granularity, Sample, SeriesPoint};
pub use crate::error::{ForecastError, Result};
pub use crate::interpretation::{Certainty, TrendDirection, TrendSummary};
pub use crate::intervals::ConfidenceBound;
pub use crate::models::{ForecastMethod, ForecastModel, MethodForecast, TrainedForecastModel};
pub use crate::orchestrator::{forecast, ForecastRequest, PredictionResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
