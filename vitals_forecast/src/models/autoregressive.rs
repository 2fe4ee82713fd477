//! Autoregressive forecasting on differenced series ("ARIMA-like")

use crate::data::AggregatedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    require_history, tail_residuals, ForecastMethod, ForecastModel, TrainedForecastModel,
};
use tracing::debug;
use vitals_math::stats::{difference, integrate, mean};
use vitals_math::{solve_least_squares, MathError};

/// Smallest history the autoregression is attempted on
const MIN_POINTS: usize = 3;

/// Largest AR order with a closed-form stationarity check
const MAX_ORDER: usize = 2;

/// Autoregressive model on first differences, ARI(p,1) with intercept
#[derive(Debug, Clone)]
pub struct AutoregressiveModel {
    /// Largest AR order tried
    max_order: usize,
}

/// Trained autoregressive model
#[derive(Debug, Clone)]
pub struct TrainedAutoregressiveModel {
    /// Selected AR order; 0 means drift only or a flat fallback
    order: usize,
    /// Constant term of the difference equation
    intercept: f64,
    /// Fitted AR coefficients, lag 1 first
    coefficients: Vec<f64>,
    /// Most recent differences, oldest first
    recent_differences: Vec<f64>,
    /// Last observed level
    last_value: f64,
    /// False when the history was too short to difference
    differenced: bool,
    /// One-step fitted levels for the tail of the history
    fitted: Vec<f64>,
    /// Residuals from fitting
    residuals: Vec<f64>,
}

/// Least-squares fit of one order on the differenced series
#[derive(Debug, Clone)]
struct DifferenceFit {
    order: usize,
    intercept: f64,
    coefficients: Vec<f64>,
    /// Fitted differences for the tail of the differenced series
    fitted: Vec<f64>,
    mse: f64,
}

impl AutoregressiveModel {
    /// Create a model trying AR orders `1..=max_order`, with `max_order` 1 or 2
    pub fn new(max_order: usize) -> Result<Self> {
        if max_order == 0 || max_order > MAX_ORDER {
            return Err(ForecastError::InvalidParameter(format!(
                "Autoregressive order must be between 1 and {}, got {}",
                MAX_ORDER, max_order
            )));
        }
        Ok(Self { max_order })
    }
}

impl Default for AutoregressiveModel {
    fn default() -> Self {
        Self {
            max_order: MAX_ORDER,
        }
    }
}

/// Regression rows needed for `order` coefficients plus the mean difference
fn required_rows(order: usize) -> usize {
    2 * (order + 1)
}

/// Whether the difference equation with these coefficients is stationary
fn is_stationary(coefficients: &[f64]) -> bool {
    match coefficients {
        [] => true,
        [phi1] => phi1.abs() < 1.0,
        [phi1, phi2] => phi2.abs() < 1.0 && phi1 + phi2 < 1.0 && phi2 - phi1 < 1.0,
        _ => false,
    }
}

/// Fit `d[t] - μ = φ1 (d[t-1] - μ) + ... + φp (d[t-p] - μ)` by least squares
/// on the targets `d[start..]`, where μ is the mean difference.
///
/// The intercept of the equivalent `d[t] = c + Σ φk d[t-k]` form is
/// `c = μ (1 - Σ φk)`, so the long-run drift stays at μ.
fn fit_order(
    differences: &[f64],
    drift: f64,
    order: usize,
    start: usize,
) -> std::result::Result<DifferenceFit, MathError> {
    let rows_available = differences.len().saturating_sub(start);
    if start < order || rows_available < required_rows(order) {
        return Err(MathError::InsufficientData(format!(
            "AR({}) needs {} regression rows, have {}",
            order,
            required_rows(order),
            rows_available
        )));
    }

    let centered: Vec<f64> = differences.iter().map(|d| d - drift).collect();
    let rows: Vec<Vec<f64>> = (start..centered.len())
        .map(|t| (1..=order).map(|lag| centered[t - lag]).collect())
        .collect();
    let targets = &centered[start..];

    let coefficients = solve_least_squares(&rows, targets)?;
    if !is_stationary(&coefficients) {
        return Err(MathError::CalculationError(format!(
            "AR({}) fit {:?} is not stationary",
            order, coefficients
        )));
    }

    let fitted: Vec<f64> = rows
        .iter()
        .map(|row| drift + row.iter().zip(&coefficients).map(|(x, b)| x * b).sum::<f64>())
        .collect();
    let mse = differences[start..]
        .iter()
        .zip(&fitted)
        .map(|(d, f)| (d - f).powi(2))
        .sum::<f64>()
        / fitted.len() as f64;

    Ok(DifferenceFit {
        order,
        intercept: drift * (1.0 - coefficients.iter().sum::<f64>()),
        coefficients,
        fitted,
        mse,
    })
}

/// Random walk with drift, used when no AR order can be fitted
fn drift_fit(differences: &[f64], drift: f64) -> DifferenceFit {
    let mse = differences.iter().map(|d| (d - drift).powi(2)).sum::<f64>()
        / differences.len() as f64;
    DifferenceFit {
        order: 0,
        intercept: drift,
        coefficients: Vec::new(),
        fitted: vec![drift; differences.len()],
        mse,
    }
}

impl ForecastModel for AutoregressiveModel {
    type Trained = TrainedAutoregressiveModel;

    fn train(&self, series: &AggregatedSeries) -> Result<TrainedAutoregressiveModel> {
        let values = require_history(series)?;
        let last_value = values[values.len() - 1];

        if values.len() < MIN_POINTS {
            // Too short to difference meaningfully: naive one-step fit
            let fitted = values[..values.len() - 1].to_vec();
            let residuals = tail_residuals(&values, &fitted);
            debug!(points = values.len(), "Autoregressive fallback to flat forecast");
            return Ok(TrainedAutoregressiveModel {
                order: 0,
                intercept: 0.0,
                coefficients: Vec::new(),
                recent_differences: Vec::new(),
                last_value,
                differenced: false,
                fitted,
                residuals,
            });
        }

        let differences = difference(&values);
        let drift = mean(&differences)?;

        // Every order is scored on the same target rows
        let orders: Vec<usize> = (1..=self.max_order)
            .filter(|&order| differences.len().saturating_sub(order) >= required_rows(order))
            .collect();
        let start = orders.last().copied().unwrap_or(0);

        let mut best: Option<DifferenceFit> = None;
        for &order in &orders {
            match fit_order(&differences, drift, order, start) {
                Ok(fit) => {
                    if best.as_ref().map_or(true, |b| fit.mse < b.mse) {
                        best = Some(fit);
                    }
                }
                Err(err) => debug!(order, error = %err, "Skipping autoregressive order"),
            }
        }
        let fit = best.unwrap_or_else(|| drift_fit(&differences, drift));
        debug!(order = fit.order, mse = fit.mse, "Selected autoregressive order");

        // Level at t+1 is level at t plus the fitted difference at t
        let offset = differences.len() - fit.fitted.len();
        let fitted: Vec<f64> = fit
            .fitted
            .iter()
            .enumerate()
            .map(|(i, d)| values[offset + i] + d)
            .collect();
        let residuals = tail_residuals(&values, &fitted);

        let keep = fit.order.min(differences.len());
        let recent_differences = differences[differences.len() - keep..].to_vec();

        Ok(TrainedAutoregressiveModel {
            order: fit.order,
            intercept: fit.intercept,
            coefficients: fit.coefficients,
            recent_differences,
            last_value,
            differenced: true,
            fitted,
            residuals,
        })
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Autoregressive
    }
}

impl TrainedAutoregressiveModel {
    /// Selected AR order (0 for drift or flat fallback)
    pub fn order(&self) -> usize {
        self.order
    }

    /// Fitted AR coefficients, lag 1 first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Project future differences with the fitted difference equation
    fn forecast_differences(&self, horizon: usize) -> Vec<f64> {
        let mut history = self.recent_differences.clone();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let mut next = self.intercept;
            for (lag, phi) in self.coefficients.iter().enumerate() {
                next += phi * history[history.len() - 1 - lag];
            }
            history.push(next);
            forecasts.push(next);
        }

        forecasts
    }
}

impl TrainedForecastModel for TrainedAutoregressiveModel {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if !self.differenced {
            return Ok(vec![self.last_value; horizon]);
        }
        let differences = self.forecast_differences(horizon);
        Ok(integrate(self.last_value, &differences))
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Autoregressive
    }
}
