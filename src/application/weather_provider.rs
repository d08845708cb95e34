// Provider trait for weather data access
use crate::domain::forecast::Units;
use crate::domain::location::LocationQuery;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions; `Ok(None)` when the provider does not know the location
    async fn fetch_current(&self, query: &LocationQuery, units: Units) -> anyhow::Result<Option<Value>>;

    /// Multi-day forecast payload holding a `list` of raw samples
    async fn fetch_forecast(&self, query: &LocationQuery, units: Units) -> anyhow::Result<Option<Value>>;
}
