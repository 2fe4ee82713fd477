use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use std::collections::BTreeMap;
use vitals_forecast::intervals::ConfidenceIntervalEstimator;
use vitals_forecast::models::autoregressive::AutoregressiveModel;
use vitals_forecast::models::ensemble::EnsembleCombiner;
use vitals_forecast::models::linear::LinearTrend;
use vitals_forecast::models::seasonal::SeasonalDecomposition;
use vitals_forecast::{
    AggregatedSeries, ForecastMethod, ForecastModel, Granularity, TrainedForecastModel,
};

fn series(values: &[f64]) -> AggregatedSeries {
    let start = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
    AggregatedSeries::from_values(start, Granularity::Day, values)
}

/// Weekly pattern on a slow upward trend with seeded noise
fn noisy_glucose(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|i| {
            let weekly = [0.0, 2.0, 1.0, -1.0, 0.0, 6.0, 5.0][i % 7];
            105.0 + 0.3 * i as f64 + weekly + rng.gen_range(-3.0..3.0)
        })
        .collect()
}

fn forecast_with<M: ForecastModel>(model: &M, values: &[f64], horizon: usize) -> Vec<f64> {
    model.train(&series(values)).unwrap().forecast(horizon).unwrap()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[case(30)]
fn test_flat_input_gives_flat_forecast(#[case] len: usize) {
    let values = vec![70.0; len];

    assert_eq!(forecast_with(&LinearTrend::new(), &values, 4), vec![70.0; 4]);
    assert_eq!(
        forecast_with(&AutoregressiveModel::default(), &values, 4),
        vec![70.0; 4]
    );
    for v in forecast_with(&SeasonalDecomposition::new(7).unwrap(), &values, 4) {
        assert_relative_eq!(v, 70.0, epsilon = 1e-9);
    }
}

#[rstest]
#[case(ForecastMethod::Linear)]
#[case(ForecastMethod::Autoregressive)]
#[case(ForecastMethod::Seasonal)]
fn test_flat_input_has_zero_width_band(#[case] method: ForecastMethod) {
    let s = series(&[70.0; 10]);
    let residuals = match method {
        ForecastMethod::Linear => LinearTrend::new().train(&s).unwrap().residuals().to_vec(),
        ForecastMethod::Autoregressive => AutoregressiveModel::default()
            .train(&s)
            .unwrap()
            .residuals()
            .to_vec(),
        _ => SeasonalDecomposition::new(7)
            .unwrap()
            .train(&s)
            .unwrap()
            .residuals()
            .to_vec(),
    };

    let band = ConfidenceIntervalEstimator::default().estimate(&[70.0; 5], &residuals);
    assert!(band.iter().all(|b| b.width() == 0.0));
}

#[rstest]
#[case(1, 14)]
#[case(2, 5)]
#[case(3, 28)]
fn test_noisy_series_forecast_lengths(#[case] seed: u64, #[case] horizon: usize) {
    let values = noisy_glucose(35, seed);

    for trained_values in [
        forecast_with(&LinearTrend::new(), &values, horizon),
        forecast_with(&AutoregressiveModel::default(), &values, horizon),
        forecast_with(&SeasonalDecomposition::new(7).unwrap(), &values, horizon),
    ] {
        assert_eq!(trained_values.len(), horizon);
        assert!(trained_values.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_ensemble_lies_between_members() {
    let values = noisy_glucose(28, 7);
    let horizon = 10;

    let mut members = BTreeMap::new();
    members.insert(
        ForecastMethod::Linear,
        forecast_with(&LinearTrend::new(), &values, horizon),
    );
    members.insert(
        ForecastMethod::Autoregressive,
        forecast_with(&AutoregressiveModel::default(), &values, horizon),
    );
    members.insert(
        ForecastMethod::Seasonal,
        forecast_with(&SeasonalDecomposition::new(7).unwrap(), &values, horizon),
    );

    let ensemble = EnsembleCombiner::new().combine(&members).unwrap();

    for (i, value) in ensemble.iter().enumerate() {
        let lo = members.values().map(|v| v[i]).fold(f64::INFINITY, f64::min);
        let hi = members.values().map(|v| v[i]).fold(f64::NEG_INFINITY, f64::max);
        assert!(lo - 1e-9 <= *value && *value <= hi + 1e-9);
    }
}

#[test]
fn test_noisy_residual_band_widens() {
    let values = noisy_glucose(21, 11);
    let trained = LinearTrend::new().train(&series(&values)).unwrap();
    let forecast = trained.forecast(8).unwrap();

    let band = ConfidenceIntervalEstimator::default().estimate(&forecast, trained.residuals());

    assert!(band[0].width() > 0.0);
    for pair in band.windows(2) {
        assert!(pair[1].width() >= pair[0].width());
    }
    for (b, v) in band.iter().zip(&forecast) {
        assert!(b.lower <= *v && *v <= b.upper);
    }
}

#[test]
fn test_seasonal_needs_two_periods() {
    let short = noisy_glucose(13, 3);
    let trained = SeasonalDecomposition::new(7)
        .unwrap()
        .train(&series(&short))
        .unwrap();
    assert!(trained.seasonal_component().iter().all(|s| *s == 0.0));

    let long = noisy_glucose(14, 3);
    let trained = SeasonalDecomposition::new(7)
        .unwrap()
        .train(&series(&long))
        .unwrap();
    assert!(trained.seasonal_component().iter().any(|s| *s != 0.0));
}
