// Weather service - Use cases for current conditions, forecasts and ranges
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::place_corrector::{resolve_corrected, PlaceCorrector};
use crate::application::summarizer::Summarizer;
use crate::application::weather_provider::WeatherProvider;
use crate::domain::forecast::{
    aggregate_entries, daily_outlook, forecast_entries, DailySummary, DateWindow, Units,
    FORECAST_HORIZON_DAYS,
};
use crate::domain::history::RangeSummary;
use crate::domain::location::LocationQuery;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Days shown in the forecast outlook.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Aggregated forecast for a requested date range, after clipping to the horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeReport {
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(flatten)]
    pub summary: RangeSummary,
}

#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    corrector: Arc<dyn PlaceCorrector>,
    summarizer: Arc<dyn Summarizer>,
    country_hint: String,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        corrector: Arc<dyn PlaceCorrector>,
        summarizer: Arc<dyn Summarizer>,
        country_hint: String,
    ) -> Self {
        Self {
            provider,
            corrector,
            summarizer,
            country_hint,
        }
    }

    async fn locate(&self, city: &str) -> ServiceResult<LocationQuery> {
        if city.trim().is_empty() {
            return Err(ServiceError::invalid_input("Please enter a valid city name"));
        }
        Ok(resolve_corrected(city, &self.country_hint, self.corrector.as_ref()).await)
    }

    pub async fn current(&self, city: &str, units: Units) -> ServiceResult<Value> {
        let query = self.locate(city).await?;
        tracing::debug!("Fetching current weather for {:?} ({})", query, units.as_str());
        self.provider
            .fetch_current(&query, units)
            .await?
            .ok_or_else(|| ServiceError::not_found("Location not found"))
    }

    pub async fn forecast(&self, city: &str, units: Units) -> ServiceResult<Value> {
        let query = self.locate(city).await?;
        tracing::debug!("Fetching forecast for {:?} ({})", query, units.as_str());
        self.provider
            .fetch_forecast(&query, units)
            .await?
            .ok_or_else(|| ServiceError::not_found("Location not found"))
    }

    /// Daily min/avg/max for the first days of the forecast
    pub async fn daily(&self, city: &str, units: Units) -> ServiceResult<Vec<DailySummary>> {
        let forecast = self.forecast(city, units).await?;
        Ok(daily_outlook(&forecast, MAX_FORECAST_DAYS))
    }

    /// Daily summaries for `[from, to]`, clipped to what the forecast covers from `today`
    pub async fn range(
        &self,
        city: &str,
        from: NaiveDate,
        to: NaiveDate,
        units: Units,
        today: NaiveDate,
    ) -> ServiceResult<RangeReport> {
        if from > to {
            return Err(ServiceError::invalid_input("Start date cannot be after end date"));
        }
        let (date_from, date_to) = DateWindow::clip_to_horizon(from, to, today, FORECAST_HORIZON_DAYS)
            .ok_or_else(|| {
                ServiceError::invalid_input(format!(
                    "Date range must be within the next {} days",
                    FORECAST_HORIZON_DAYS
                ))
            })?;

        let forecast = self.forecast(city, units).await?;
        if forecast.get("list").is_none() {
            return Err(ServiceError::not_found("No forecast data available"));
        }

        let daily_summary = aggregate_entries(
            forecast_entries(&forecast),
            DateWindow::between(date_from, date_to),
        );
        tracing::debug!(
            "Range {}..{} for {} produced {} days",
            date_from,
            date_to,
            city,
            daily_summary.len()
        );

        Ok(RangeReport {
            city: city.trim().to_string(),
            date_from,
            date_to,
            summary: RangeSummary {
                unit: units,
                daily_summary,
            },
        })
    }

    pub async fn summarize(&self, city: &str, current: &Value, forecast: &Value) -> ServiceResult<String> {
        Ok(self.summarizer.summarize(city, current, forecast).await?)
    }
}
