//! # Vitals
//!
//! `vitals_workspace` bundles the health-metric forecasting crates of the
//! workspace behind one dependency.
//!
//! ## Example
//!
//! ```
//! use vitals_workspace::{ForecastMethod, Granularity};
//!
//! let method: ForecastMethod = "ensemble".parse().unwrap();
//! assert_eq!(method, ForecastMethod::Ensemble);
//! assert_eq!(Granularity::Day.default_period(), 7);
//! ```

pub use vitals_forecast::*;

/// Numeric building blocks (least squares, statistics, accuracy metrics)
pub use vitals_math as math;
