// CSV rendering of saved history records
use crate::domain::forecast::Units;
use crate::domain::history::{decode_data, HistoryRecord};
use anyhow::{anyhow, Result};
use serde_json::Value;

const CONDITION_FIELDS: [(&str, &str); 7] = [
    ("condition", "Condition"),
    ("temp", "Temperature"),
    ("feels_like", "Feels Like"),
    ("humidity", "Humidity (%)"),
    ("pressure", "Pressure (hPa)"),
    ("visibility", "Visibility (m)"),
    ("wind_speed", "Wind Speed"),
];

/// Render a record's data blob as CSV.
///
/// Range blobs (`daily_summary`, or a bare list of days) become one row per
/// day; condition snapshots become field/value rows; anything else is dumped
/// as raw JSON.
pub fn history_to_csv(record: &HistoryRecord) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let data = &decode_data(record.data.clone());
    let units = data
        .get("unit")
        .and_then(|u| serde_json::from_value::<Units>(u.clone()).ok())
        .unwrap_or_default();
    let temp = units.temperature_symbol();

    let days = match data {
        Value::Array(days) => Some(days),
        Value::Object(map) => map.get("daily_summary").and_then(Value::as_array),
        _ => None,
    };

    if let Some(days) = days {
        writer.write_record([
            "Date".to_string(),
            format!("Avg Temp ({})", temp),
            format!("Min Temp ({})", temp),
            format!("Max Temp ({})", temp),
        ])?;
        for day in days {
            writer.write_record([
                text(day.get("date")),
                rounded(day.get("avg_temp")),
                rounded(day.get("min_temp")),
                rounded(day.get("max_temp")),
            ])?;
        }
    } else if let Value::Object(map) = data {
        writer.write_record(["Field", "Value"])?;
        for (key, label) in CONDITION_FIELDS {
            let label = match key {
                "temp" | "feels_like" => format!("{} ({})", label, temp),
                "wind_speed" => format!("{} ({})", label, units.wind_symbol()),
                _ => label.to_string(),
            };
            writer.write_record([label, rounded(map.get(key))])?;
        }
    } else {
        writer.write_record(["Data"])?;
        writer.write_record([data.to_string()])?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV export: {}", e.error()))
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// One decimal for numbers, verbatim text otherwise.
fn rounded(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(n) => format!("{:.1}", n),
        None => text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(data: Value) -> HistoryRecord {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        HistoryRecord {
            id: 1,
            city: "Rome".to_string(),
            date_from: date,
            date_to: date,
            data,
        }
    }

    fn render(data: Value) -> String {
        String::from_utf8(history_to_csv(&record(data)).unwrap()).unwrap()
    }

    #[test]
    fn test_range_blob() {
        let csv = render(json!({
            "unit": "imperial",
            "daily_summary": [
                {"date": "2024-06-01", "avg_temp": 70.26, "min_temp": 60, "max_temp": 80.04, "samples": 8}
            ]
        }));

        assert_eq!(
            csv,
            "Date,Avg Temp (°F),Min Temp (°F),Max Temp (°F)\n2024-06-01,70.3,60.0,80.0\n"
        );
    }

    #[test]
    fn test_bare_day_list() {
        let csv = render(json!([{"date": "2024-06-02", "avg_temp": 1.0}]));
        assert_eq!(
            csv,
            "Date,Avg Temp (°C),Min Temp (°C),Max Temp (°C)\n2024-06-02,1.0,-,-\n"
        );
    }

    #[test]
    fn test_conditions_blob() {
        let csv = render(json!({
            "unit": "metric",
            "condition": "Clear sky",
            "temp": 21.55,
            "humidity": 40,
            "visibility": null,
            "wind_speed": 3.0
        }));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Field,Value");
        assert_eq!(lines[1], "Condition,Clear sky");
        assert_eq!(lines[2], "Temperature (°C),21.6");
        assert_eq!(lines[3], "Feels Like (°C),-");
        assert_eq!(lines[6], "Visibility (m),-");
        assert_eq!(lines[7], "Wind Speed (m/s),3.0");
    }

    #[test]
    fn test_encoded_range_blob() {
        let encoded = json!({
            "unit": "metric",
            "daily_summary": [{"date": "2024-06-01", "avg_temp": 20, "min_temp": 15, "max_temp": 25}]
        })
        .to_string();

        assert_eq!(
            render(Value::String(encoded)),
            "Date,Avg Temp (°C),Min Temp (°C),Max Temp (°C)\n2024-06-01,20.0,15.0,25.0\n"
        );
    }

    #[test]
    fn test_opaque_blob() {
        assert_eq!(render(json!("free text")), "Data\n\"\"\"free text\"\"\"\n");
    }
}
