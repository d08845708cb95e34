// Summarizer trait - Plain-text description of a location's weather
use crate::domain::forecast::daily_outlook;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, city: &str, current: &Value, forecast: &Value) -> anyhow::Result<String>;
}

/// Deterministic summary built from the payload fields.
#[derive(Debug, Clone, Default)]
pub struct TemplateSummarizer;

#[async_trait]
impl Summarizer for TemplateSummarizer {
    async fn summarize(&self, city: &str, current: &Value, forecast: &Value) -> anyhow::Result<String> {
        let name = current.get("name").and_then(Value::as_str).unwrap_or(city);
        let mut parts = Vec::new();

        let description = current
            .get("weather")
            .and_then(|w| w.get(0))
            .and_then(|w| w.get("description"))
            .and_then(Value::as_str);
        let temp = current
            .get("main")
            .and_then(|m| m.get("temp"))
            .and_then(Value::as_f64);

        match (description, temp) {
            (Some(d), Some(t)) => parts.push(format!("{} is currently {} at {:.1}°.", name, d, t)),
            (Some(d), None) => parts.push(format!("{} is currently {}.", name, d)),
            (None, Some(t)) => parts.push(format!("{} is currently {:.1}°.", name, t)),
            (None, None) => parts.push(format!("No current conditions for {}.", name)),
        }

        let outlook = daily_outlook(forecast, 5);
        if let (Some(low), Some(high)) = (
            outlook.iter().map(|d| d.min_temp).reduce(f64::min),
            outlook.iter().map(|d| d.max_temp).reduce(f64::max),
        ) {
            parts.push(format!(
                "Over the next {} days temperatures range from {:.1}° to {:.1}°.",
                outlook.len(),
                low,
                high
            ));
        }

        Ok(parts.join(" "))
    }
}
