// Short-lived memoization of provider responses
use crate::application::weather_provider::WeatherProvider;
use crate::domain::forecast::Units;
use crate::domain::location::LocationQuery;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Endpoint {
    Current,
    Forecast,
}

type CacheKey = (Endpoint, String, Units);

/// Wraps a provider and reuses found payloads for `ttl`. Absences are never cached.
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, (Instant, Value)>>,
}

impl CachedWeatherProvider {
    pub fn new(inner: Arc<dyn WeatherProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    async fn store(&self, key: CacheKey, value: &Value) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(key, (Instant::now(), value.clone()));
    }

    async fn fetch(&self, endpoint: Endpoint, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        if self.ttl.is_zero() {
            return self.fetch_inner(endpoint, query, units).await;
        }

        let key = (endpoint, query.cache_key(), units);
        if let Some(value) = self.lookup(&key).await {
            tracing::debug!("Cache hit for {:?} {}", endpoint, key.1);
            return Ok(Some(value));
        }

        let fetched = self.fetch_inner(endpoint, query, units).await?;
        if let Some(value) = &fetched {
            self.store(key, value).await;
        }
        Ok(fetched)
    }

    async fn fetch_inner(&self, endpoint: Endpoint, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        match endpoint {
            Endpoint::Current => self.inner.fetch_current(query, units).await,
            Endpoint::Forecast => self.inner.fetch_forecast(query, units).await,
        }
    }
}

#[async_trait]
impl WeatherProvider for CachedWeatherProvider {
    async fn fetch_current(&self, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        self.fetch(Endpoint::Current, query, units).await
    }

    async fn fetch_forecast(&self, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        self.fetch(Endpoint::Forecast, query, units).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        response: Option<Value>,
    }

    impl CountingProvider {
        fn new(response: Option<Value>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn fetch_current(&self, _query: &LocationQuery, _units: Units) -> Result<Option<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn fetch_forecast(&self, _query: &LocationQuery, _units: Units) -> Result<Option<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    fn london() -> LocationQuery {
        LocationQuery::PlaceName {
            text: "London".to_string(),
        }
    }

    #[tokio::test]
    async fn test_repeated_request_is_served_from_cache() {
        let inner = CountingProvider::new(Some(json!({"name": "London"})));
        let cached = CachedWeatherProvider::new(inner.clone(), Duration::from_secs(60));

        let first = cached.fetch_current(&london(), Units::Metric).await.unwrap();
        let second = cached.fetch_current(&london(), Units::Metric).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_key_includes_endpoint_and_units() {
        let inner = CountingProvider::new(Some(json!({})));
        let cached = CachedWeatherProvider::new(inner.clone(), Duration::from_secs(60));

        cached.fetch_current(&london(), Units::Metric).await.unwrap();
        cached.fetch_current(&london(), Units::Imperial).await.unwrap();
        cached.fetch_forecast(&london(), Units::Metric).await.unwrap();

        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_absence_is_not_cached() {
        let inner = CountingProvider::new(None);
        let cached = CachedWeatherProvider::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.fetch_current(&london(), Units::Metric).await.unwrap().is_none());
        assert!(cached.fetch_current(&london(), Units::Metric).await.unwrap().is_none());

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let inner = CountingProvider::new(Some(json!({})));
        let cached = CachedWeatherProvider::new(inner.clone(), Duration::from_millis(10));

        cached.fetch_current(&london(), Units::Metric).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cached.fetch_current(&london(), Units::Metric).await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_caching() {
        let inner = CountingProvider::new(Some(json!({})));
        let cached = CachedWeatherProvider::new(inner.clone(), Duration::ZERO);

        cached.fetch_current(&london(), Units::Metric).await.unwrap();
        cached.fetch_current(&london(), Units::Metric).await.unwrap();

        assert_eq!(inner.calls(), 2);
    }
}
