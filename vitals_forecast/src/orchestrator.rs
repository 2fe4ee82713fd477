//! Request handling: validate, aggregate, forecast, bound and interpret

use crate::config::ForecastConfig;
use crate::data::{aggregate, window_samples, AggregatedSeries, Granularity, Sample};
use crate::error::{ForecastError, Result};
use crate::interpretation::{TrendInterpreter, TrendSummary};
use crate::intervals::ConfidenceIntervalEstimator;
use crate::models::autoregressive::AutoregressiveModel;
use crate::models::ensemble::EnsembleCombiner;
use crate::models::linear::LinearTrend;
use crate::models::seasonal::SeasonalDecomposition;
use crate::models::{
    tail_residuals, ForecastMethod, ForecastModel, MethodForecast, TrainedForecastModel,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use vitals_math::forecast_accuracy;

/// Parameters of one forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Label of the metric, e.g. "heart_rate"
    pub metric_type: String,
    /// History window in days, counted back from the newest sample
    pub days_analyzed: u32,
    /// Number of future buckets
    pub horizon: usize,
    pub method: ForecastMethod,
    pub include_confidence_interval: bool,
    pub bucket: Granularity,
}

impl ForecastRequest {
    /// Request with a 30 day window, 7 bucket horizon and daily buckets
    pub fn new(metric_type: impl Into<String>, method: ForecastMethod) -> Self {
        Self {
            metric_type: metric_type.into(),
            days_analyzed: 30,
            horizon: 7,
            method,
            include_confidence_interval: true,
            bucket: Granularity::Day,
        }
    }

    /// Build a request from the names used by external callers
    pub fn parse(
        metric_type: &str,
        days_analyzed: u32,
        horizon: usize,
        method: &str,
        include_confidence_interval: bool,
        bucket: &str,
    ) -> Result<Self> {
        Ok(Self {
            metric_type: metric_type.to_string(),
            days_analyzed,
            horizon,
            method: method.parse()?,
            include_confidence_interval,
            bucket: bucket.parse()?,
        })
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_days_analyzed(mut self, days: u32) -> Self {
        self.days_analyzed = days;
        self
    }

    pub fn with_confidence_interval(mut self, include: bool) -> Self {
        self.include_confidence_interval = include;
        self
    }

    pub fn with_bucket(mut self, bucket: Granularity) -> Self {
        self.bucket = bucket;
        self
    }

    fn validate(&self, config: &ForecastConfig) -> Result<()> {
        if self.horizon == 0 || self.horizon > config.max_horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be between 1 and {}, got {}",
                config.max_horizon, self.horizon
            )));
        }
        if self.days_analyzed == 0 || self.days_analyzed > config.max_days_analyzed {
            return Err(ForecastError::InvalidParameter(format!(
                "days_analyzed must be between 1 and {}, got {}",
                config.max_days_analyzed, self.days_analyzed
            )));
        }
        Ok(())
    }
}

/// Everything returned for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub metric_type: String,
    /// Number of aggregated buckets the methods were fitted on
    pub buckets_analyzed: usize,
    pub horizon: usize,
    pub selected_method: ForecastMethod,
    /// Number of samples inside the history window
    pub data_point_count: usize,
    pub primary: MethodForecast,
    /// Every member forecast plus the ensemble, for ensemble requests only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_methods: Option<BTreeMap<ForecastMethod, MethodForecast>>,
    pub history: AggregatedSeries,
    /// Bucket start of each forecast value
    pub forecast_buckets: Vec<DateTime<Utc>>,
    pub trend: TrendSummary,
}

/// Output of one fitted method before interval estimation
#[derive(Debug, Clone)]
struct MethodRun {
    method: ForecastMethod,
    values: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

fn run_model<M: ForecastModel>(
    model: &M,
    series: &AggregatedSeries,
    horizon: usize,
) -> Result<MethodRun> {
    let trained = model.train(series)?;
    Ok(MethodRun {
        method: trained.method(),
        values: trained.forecast(horizon)?,
        fitted: trained.fitted().to_vec(),
        residuals: trained.residuals().to_vec(),
    })
}

fn run_method(
    method: ForecastMethod,
    series: &AggregatedSeries,
    horizon: usize,
    period: usize,
) -> Result<MethodRun> {
    match method {
        ForecastMethod::Linear => run_model(&LinearTrend::new(), series, horizon),
        ForecastMethod::Autoregressive => {
            run_model(&AutoregressiveModel::default(), series, horizon)
        }
        ForecastMethod::Seasonal => {
            run_model(&SeasonalDecomposition::new(period)?, series, horizon)
        }
        ForecastMethod::Ensemble => Err(ForecastError::InvalidParameter(
            "ensemble is not an individual method".to_string(),
        )),
    }
}

/// Fit the three member methods, fork-join on the rayon pool when `parallel`
fn run_members(
    series: &AggregatedSeries,
    horizon: usize,
    period: usize,
    parallel: bool,
) -> Vec<(ForecastMethod, Result<MethodRun>)> {
    let [linear, autoregressive, seasonal] = ForecastMethod::MEMBERS;
    let run = |method| run_method(method, series, horizon, period);

    let (linear_run, (autoregressive_run, seasonal_run)) = if parallel {
        rayon::join(
            || run(linear),
            || rayon::join(|| run(autoregressive), || run(seasonal)),
        )
    } else {
        (run(linear), (run(autoregressive), run(seasonal)))
    };

    vec![
        (linear, linear_run),
        (autoregressive, autoregressive_run),
        (seasonal, seasonal_run),
    ]
}

fn to_forecast(
    run: MethodRun,
    history: &[f64],
    estimator: Option<&ConfidenceIntervalEstimator>,
) -> Result<MethodForecast> {
    let fit = if run.fitted.is_empty() {
        None
    } else {
        let actual = &history[history.len() - run.fitted.len()..];
        Some(forecast_accuracy(&run.fitted, actual)?)
    };

    let forecast = MethodForecast::new(run.method, run.values).with_fit(fit);
    match estimator {
        Some(estimator) => {
            let band = estimator.estimate(&forecast.values, &run.residuals);
            forecast.with_interval(band)
        }
        None => Ok(forecast),
    }
}

/// Produce a forecast for `samples`.
///
/// `samples` must already be filtered to one patient and metric. Parameters
/// are validated before any computation; every failure is returned as a
/// [`ForecastError`].
pub fn forecast(
    samples: &[Sample],
    request: &ForecastRequest,
    config: &ForecastConfig,
) -> Result<PredictionResult> {
    config.validate()?;
    request.validate(config)?;

    let windowed = window_samples(samples, request.days_analyzed);
    let data_point_count = windowed.iter().filter(|s| s.value.is_finite()).count();
    let series = aggregate(&windowed, request.bucket)?;
    let history = series.values();

    let horizon = request.horizon;
    let period = config.seasonal_period.unwrap_or(request.bucket.default_period());
    let estimator = if request.include_confidence_interval {
        Some(ConfidenceIntervalEstimator::new(config.interval_multiplier)?)
    } else {
        None
    };
    debug!(
        metric = %request.metric_type,
        buckets = series.len(),
        period,
        "Running forecast"
    );

    let (primary, all_methods) = match request.method {
        ForecastMethod::Ensemble => {
            let mut members = Vec::new();
            for (method, outcome) in run_members(&series, horizon, period, config.parallel) {
                match outcome {
                    Ok(run) => members.push(run),
                    Err(err) => warn!(%method, error = %err, "Ensemble member failed"),
                }
            }

            let values: BTreeMap<ForecastMethod, Vec<f64>> = members
                .iter()
                .map(|run| (run.method, run.values.clone()))
                .collect();
            let combiner = EnsembleCombiner::new();
            let ensemble_values = combiner.combine(&values)?;

            let fitted_tails: Vec<&[f64]> = members.iter().map(|r| r.fitted.as_slice()).collect();
            let ensemble_fitted = combiner.combine_fitted(&fitted_tails);
            let ensemble_run = MethodRun {
                method: ForecastMethod::Ensemble,
                residuals: tail_residuals(&history, &ensemble_fitted),
                values: ensemble_values,
                fitted: ensemble_fitted,
            };

            let mut all = BTreeMap::new();
            for run in members {
                all.insert(run.method, to_forecast(run, &history, estimator.as_ref())?);
            }
            let ensemble = to_forecast(ensemble_run, &history, estimator.as_ref())?;
            all.insert(ForecastMethod::Ensemble, ensemble.clone());

            (ensemble, Some(all))
        }
        method => {
            let run = run_method(method, &series, horizon, period)?;
            (to_forecast(run, &history, estimator.as_ref())?, None)
        }
    };

    let trend = TrendInterpreter::from_config(config)
        .interpret(&primary.values, primary.confidence_interval.as_deref())?;

    info!(
        metric = %request.metric_type,
        method = %request.method,
        buckets = series.len(),
        horizon,
        direction = %trend.direction,
        "Forecast complete"
    );

    Ok(PredictionResult {
        metric_type: request.metric_type.clone(),
        buckets_analyzed: series.len(),
        horizon,
        selected_method: request.method,
        data_point_count,
        primary,
        all_methods,
        forecast_buckets: series.future_buckets(request.bucket, horizon),
        history: series,
        trend,
    })
}
