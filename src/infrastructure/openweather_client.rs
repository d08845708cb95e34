// OpenWeather provider implementation
use crate::application::weather_provider::WeatherProvider;
use crate::domain::forecast::Units;
use crate::domain::location::LocationQuery;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn fetch(&self, endpoint: &str, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut params = query.to_params();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", units.as_str().to_string()));

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({})", endpoint))?;

        let status = response.status();
        // Unknown cities answer 404; unusable coordinates or zips answer 400
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            tracing::debug!("OpenWeather {} has no data for {:?} ({})", endpoint, query, status);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "OpenWeather {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body)
            );
        }

        let data = response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse OpenWeather {} response", endpoint))?;
        Ok(Some(data))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        self.fetch("weather", query, units).await
    }

    async fn fetch_forecast(&self, query: &LocationQuery, units: Units) -> Result<Option<Value>> {
        self.fetch("forecast", query, units).await
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(&server.uri(), "test_key".to_string(), Duration::from_secs(5)).unwrap()
    }

    fn place(text: &str) -> LocationQuery {
        LocationQuery::PlaceName {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_current_sends_location_and_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "London"})))
            .mount(&server)
            .await;

        let current = client(&server)
            .fetch_current(&place("London"), Units::Imperial)
            .await
            .unwrap();

        assert_eq!(current, Some(json!({"name": "London"})));
    }

    #[tokio::test]
    async fn test_fetch_forecast_by_zip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("zip", "90210,us"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
            .mount(&server)
            .await;

        let query = LocationQuery::PostalCode {
            code: "90210".to_string(),
            country_hint: "us".to_string(),
        };
        let forecast = client(&server).fetch_forecast(&query, Units::Metric).await.unwrap();

        assert_eq!(forecast, Some(json!({"list": []})));
    }

    #[tokio::test]
    async fn test_unknown_location_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let current = client(&server)
            .fetch_current(&place("Atlantis"), Units::Metric)
            .await
            .unwrap();

        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_current(&place("London"), Units::Metric)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
