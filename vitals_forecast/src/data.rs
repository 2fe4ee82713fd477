//! Sample handling and calendar bucketing

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// A single physiological reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Measured value (bpm, mmHg, mg/dL, ...)
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Calendar bucket width used to aggregate samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per clock hour
    Hour,
    /// One bucket per UTC day
    #[default]
    Day,
    /// One bucket per ISO week, starting Monday
    Week,
}

impl Granularity {
    /// Start of the bucket containing `timestamp`
    pub fn truncate(self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let date = timestamp.date_naive();
        let midnight = NaiveDateTime::new(date, NaiveTime::default());
        let start = match self {
            Granularity::Hour => midnight + Duration::hours(i64::from(timestamp.hour())),
            Granularity::Day => midnight,
            Granularity::Week => {
                midnight - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
        };
        DateTime::<Utc>::from_naive_utc_and_offset(start, Utc)
    }

    /// Distance between two consecutive buckets
    pub fn step(self) -> Duration {
        match self {
            Granularity::Hour => Duration::hours(1),
            Granularity::Day => Duration::days(1),
            Granularity::Week => Duration::weeks(1),
        }
    }

    /// Natural seasonal period in buckets (hour of day, day of week, week of year)
    pub fn default_period(self) -> usize {
        match self {
            Granularity::Hour => 24,
            Granularity::Day => 7,
            Granularity::Week => 52,
        }
    }
}

impl FromStr for Granularity {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hour" | "hourly" | "h" => Ok(Granularity::Hour),
            "day" | "daily" | "d" => Ok(Granularity::Day),
            "week" | "weekly" | "w" => Ok(Granularity::Week),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown bucket granularity '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
        };
        f.write_str(name)
    }
}

/// One aggregated bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Start of the bucket
    pub bucket_date: DateTime<Utc>,
    /// Mean of the samples that fell into the bucket
    pub value: f64,
}

/// Bucketed series, strictly increasing by bucket with no duplicates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedSeries {
    points: Vec<SeriesPoint>,
}

impl AggregatedSeries {
    /// Build a series from points, rejecting unordered or duplicate buckets
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self> {
        if let Some(pair) = points
            .windows(2)
            .find(|w| w[1].bucket_date <= w[0].bucket_date)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Buckets must be strictly increasing: {} follows {}",
                pair[1].bucket_date, pair[0].bucket_date
            )));
        }
        Ok(Self { points })
    }

    /// Build a gap-free series of consecutive buckets starting at `start`
    pub fn from_values(start: DateTime<Utc>, granularity: Granularity, values: &[f64]) -> Self {
        let start = granularity.truncate(start);
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                bucket_date: start + granularity.step() * i as i32,
                value,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Bucket values in order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Start of the newest bucket
    pub fn last_bucket(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.bucket_date)
    }

    /// Starts of the `horizon` buckets following the newest one
    pub fn future_buckets(&self, granularity: Granularity, horizon: usize) -> Vec<DateTime<Utc>> {
        let Some(last) = self.last_bucket() else {
            return Vec::new();
        };
        (1..=horizon)
            .map(|i| last + granularity.step() * i as i32)
            .collect()
    }
}

/// Group samples into calendar buckets and average each bucket.
///
/// Empty buckets are omitted, so the result may be irregularly spaced.
/// Samples with non-finite values are dropped.
pub fn aggregate(samples: &[Sample], granularity: Granularity) -> Result<AggregatedSeries> {
    let mut buckets: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    let mut dropped = 0usize;

    for sample in samples {
        if !sample.value.is_finite() {
            dropped += 1;
            continue;
        }
        let entry = buckets
            .entry(granularity.truncate(sample.timestamp))
            .or_insert((0.0, 0));
        entry.0 += sample.value;
        entry.1 += 1;
    }

    if dropped > 0 {
        warn!(dropped, "Dropped samples with non-finite values");
    }

    if buckets.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "No {} buckets could be formed from {} samples",
            granularity,
            samples.len()
        )));
    }

    let points: Vec<SeriesPoint> = buckets
        .into_iter()
        .map(|(bucket_date, (sum, count))| SeriesPoint {
            bucket_date,
            value: sum / count as f64,
        })
        .collect();

    debug!(
        samples = samples.len(),
        buckets = points.len(),
        %granularity,
        "Aggregated samples"
    );

    Ok(AggregatedSeries { points })
}

/// Keep the samples from the last `days` days, measured back from the newest sample
pub fn window_samples(samples: &[Sample], days: u32) -> Vec<Sample> {
    let Some(newest) = samples.iter().map(|s| s.timestamp).max() else {
        return Vec::new();
    };
    let cutoff = newest - Duration::days(i64::from(days));
    samples
        .iter()
        .filter(|s| s.timestamp > cutoff)
        .copied()
        .collect()
}

/// Parse an RFC 3339 timestamp, `YYYY-MM-DD HH:MM:SS` or a bare date (UTC midnight)
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = NaiveDateTime::new(date, NaiveTime::default());
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }
    Err(ForecastError::Timestamp(raw.to_string()))
}

#[derive(Debug, Deserialize)]
struct SampleRecord {
    timestamp: String,
    value: f64,
}

/// Read `timestamp,value` rows (with a header) from any reader.
///
/// The returned samples are sorted by timestamp.
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for record in csv_reader.deserialize() {
        let record: SampleRecord = record?;
        samples.push(Sample::new(parse_timestamp(&record.timestamp)?, record.value));
    }
    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Load samples from a CSV file with `timestamp,value` columns
pub fn load_samples_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>> {
    let file = File::open(path)?;
    read_samples(file)
}
