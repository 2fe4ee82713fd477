use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vitals_forecast::data::load_samples_csv;
use vitals_forecast::{forecast, ForecastConfig, ForecastRequest, Result};

/// Forecast a health metric from a CSV of `timestamp,value` readings
#[derive(Parser, Debug)]
#[command(name = "vitals-forecast", version, about, long_about = None)]
struct Cli {
    /// CSV file with a `timestamp,value` header
    samples: PathBuf,

    /// Metric label carried into the result
    #[arg(short = 't', long, default_value = "metric")]
    metric_type: String,

    /// linear, autoregressive, seasonal or ensemble
    #[arg(short, long, default_value = "ensemble")]
    method: String,

    /// Number of future buckets to forecast
    #[arg(long, default_value_t = 7)]
    horizon: usize,

    /// History window in days
    #[arg(short, long, default_value_t = 30)]
    days: u32,

    /// hour, day or week
    #[arg(short, long, default_value = "day")]
    bucket: String,

    /// Omit confidence bands
    #[arg(long)]
    no_interval: bool,

    /// JSON file overriding engine settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };
    let request = ForecastRequest::parse(
        &cli.metric_type,
        cli.days,
        cli.horizon,
        &cli.method,
        !cli.no_interval,
        &cli.bucket,
    )?;

    let samples = load_samples_csv(&cli.samples)?;
    let result = forecast(&samples, &request, &config)?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    eprintln!("{}", result.trend.describe(&result.metric_type));
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitals_forecast=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
