use chrono::{Duration, TimeZone, Utc};
use vitals_forecast::{forecast, ForecastConfig, ForecastMethod, ForecastRequest, Sample};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Vitals Forecast: Basic Forecasting Example");
    println!("==========================================\n");

    let samples = create_resting_heart_rate();
    println!("Created {} heart rate readings\n", samples.len());

    let config = ForecastConfig::default();
    let request = ForecastRequest::new("resting_heart_rate", ForecastMethod::Ensemble)
        .with_days_analyzed(42)
        .with_horizon(7);

    let result = forecast(&samples, &request, &config)?;
    println!(
        "Aggregated {} readings into {} daily buckets\n",
        result.data_point_count, result.buckets_analyzed
    );

    if let Some(all_methods) = &result.all_methods {
        for (method, method_forecast) in all_methods {
            let values: Vec<String> = method_forecast
                .values
                .iter()
                .map(|v| format!("{:.1}", v))
                .collect();
            println!("{:>15}: [{}]", method, values.join(", "));
            if let Some(fit) = &method_forecast.fit {
                println!("{:>15}  in-sample {}", "", fit);
            }
        }
    }

    println!("\nEnsemble bands:");
    if let Some(bands) = &result.primary.confidence_interval {
        for (bucket, band) in result.forecast_buckets.iter().zip(bands) {
            println!(
                "  {}: {:.1} .. {:.1}",
                bucket.format("%Y-%m-%d"),
                band.lower,
                band.upper
            );
        }
    }

    println!("\n{}", result.trend.describe("Resting heart rate"));
    Ok(())
}

/// Six weeks of readings: a slow downward drift, a weekend bump and a
/// few readings per day at varying times
fn create_resting_heart_rate() -> Vec<Sample> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).unwrap();
    let mut samples = Vec::new();

    for day in 0..42 {
        let weekend = if day % 7 >= 5 { 4.0 } else { 0.0 };
        let level = 68.0 - 0.05 * day as f64 + weekend;
        for reading in 0..3 {
            let timestamp = start + Duration::days(day) + Duration::hours(5 * reading);
            let wobble = ((day * 3 + reading) % 5) as f64 * 0.4 - 0.8;
            samples.push(Sample::new(timestamp, level + wobble));
        }
    }

    samples
}
