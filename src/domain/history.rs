// History domain models - Saved weather snapshots and their summary blobs
use super::forecast::{DailySummary, Units};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub data: Value,
}

impl HistoryRecord {
    /// Download name, e.g. `New_York_(2024-06-01→2024-06-05).csv`.
    pub fn export_file_name(&self) -> String {
        format!("{} ({}→{}).csv", self.city, self.date_from, self.date_to).replace(' ', "_")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub data: Value,
}

impl NewHistoryRecord {
    /// Check the record is worth persisting; returns a user-facing reason otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.city.trim().is_empty() {
            return Err("City must not be empty".to_string());
        }
        if self.date_from > self.date_to {
            return Err("Start date cannot be after end date".to_string());
        }
        Ok(())
    }
}

/// Decode a blob that arrived as JSON-encoded text.
///
/// Only strings holding a JSON object or list are unwrapped; any other value
/// is returned as is.
pub fn decode_data(data: Value) -> Value {
    match data {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(decoded @ (Value::Object(_) | Value::Array(_))) => decoded,
            _ => Value::String(text),
        },
        other => other,
    }
}

/// Snapshot of current conditions as stored in a history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsSummary {
    pub unit: Units,
    pub condition: String,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub visibility: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl ConditionsSummary {
    /// Build from a provider current-conditions payload. Missing fields stay empty.
    pub fn from_current(current: &Value, unit: Units) -> Self {
        let main = current.get("main");
        let number = |section: Option<&Value>, key: &str| {
            section.and_then(|s| s.get(key)).and_then(Value::as_f64)
        };

        let condition = current
            .get("weather")
            .and_then(Value::as_array)
            .and_then(|list| list.first())
            .and_then(|w| w.get("description"))
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(capitalize)
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            unit,
            condition,
            temp: number(main, "temp"),
            feels_like: number(main, "feels_like"),
            humidity: number(main, "humidity"),
            pressure: number(main, "pressure"),
            visibility: current.get("visibility").and_then(Value::as_f64),
            wind_speed: number(current.get("wind"), "speed"),
        }
    }
}

/// Saved forecast range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub unit: Units,
    pub daily_summary: Vec<DailySummary>,
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
