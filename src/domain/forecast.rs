// Forecast domain models - Daily aggregation of three-hour forecast samples
use chrono::{DateTime, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Days of forecast the provider's free tier covers.
pub const FORECAST_HORIZON_DAYS: i64 = 5;

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSample {
    pub timestamp_utc: i64,
    pub temperature: f64,
}

impl ForecastSample {
    pub fn new(timestamp_utc: i64, temperature: f64) -> Self {
        Self {
            timestamp_utc,
            temperature,
        }
    }

    /// Parse a raw provider entry (`{"dt": .., "main": {"temp": ..}}`).
    ///
    /// Returns `None` when either field is missing or not numeric.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let timestamp_utc = match entry.get("dt")? {
            Value::Number(n) => match n.as_i64() {
                Some(secs) => secs,
                None => epoch_seconds(n.as_f64()?)?,
            },
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        let temperature = match entry.get("main")?.get("temp")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        if !temperature.is_finite() {
            return None;
        }
        Some(Self::new(timestamp_utc, temperature))
    }

    /// UTC calendar day of the sample, if the timestamp is representable.
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.timestamp_utc, 0).map(|dt| dt.date_naive())
    }
}

/// Float timestamps such as `1717232400.0` are truncated to whole epoch seconds.
fn epoch_seconds(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && in_range).then_some(value.trunc() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub samples: usize,
}

/// Inclusive date window; a missing bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Intersect `[from, to]` with `[today, today + horizon_days]`.
    ///
    /// Returns `None` when nothing of the requested range is forecastable.
    pub fn clip_to_horizon(
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
        horizon_days: i64,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let effective_from = from.max(today);
        let effective_to = to.min(today + Duration::days(horizon_days));
        (effective_from <= effective_to).then_some((effective_from, effective_to))
    }
}

/// Reduce samples into one summary per UTC day, ascending by date.
pub fn aggregate<I>(samples: I, window: DateWindow) -> Vec<DailySummary>
where
    I: IntoIterator<Item = ForecastSample>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();

    for sample in samples {
        if !sample.temperature.is_finite() {
            continue;
        }
        let Some(date) = sample.date() else {
            continue;
        };
        if !window.contains(date) {
            continue;
        }
        buckets.entry(date).or_default().push(sample.temperature);
    }

    buckets
        .into_iter()
        .map(|(date, mut temps)| {
            // Sum in sorted order so any input permutation gives identical bits
            temps.sort_by(f64::total_cmp);
            let count = temps.len();
            let sum: f64 = temps.iter().sum();
            let min_temp = temps[0];
            let max_temp = temps[count - 1];
            let avg_temp = (sum / count as f64).clamp(min_temp, max_temp);
            DailySummary {
                date,
                avg_temp,
                min_temp,
                max_temp,
                samples: count,
            }
        })
        .collect()
}

/// Aggregate raw provider entries, silently dropping malformed ones.
pub fn aggregate_entries(entries: &[Value], window: DateWindow) -> Vec<DailySummary> {
    aggregate(entries.iter().filter_map(ForecastSample::from_entry), window)
}

/// Entries of a provider forecast payload (`{"list": [...]}`).
pub fn forecast_entries(forecast: &Value) -> &[Value] {
    forecast
        .get("list")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Unwindowed daily outlook, capped to the first `max_days` days.
pub fn daily_outlook(forecast: &Value, max_days: usize) -> Vec<DailySummary> {
    let mut days = aggregate_entries(forecast_entries(forecast), DateWindow::default());
    days.truncate(max_days);
    days
}
