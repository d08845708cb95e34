// HTTP request handlers
use crate::application::error::ServiceError;
use crate::application::weather_service::RangeReport;
use crate::domain::forecast::{DailySummary, Units};
use crate::domain::history::{HistoryRecord, NewHistoryRecord};
use crate::infrastructure::http_response::{csv_attachment, Detail};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, ServiceError>;

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub city: String,
    #[serde(default)]
    pub units: Units,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub units: Units,
}

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub city: String,
    #[serde(default)]
    pub weather: Value,
    #[serde(default)]
    pub forecast: Value,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Deserialize, Default)]
pub struct RefreshRequest {
    pub unit: Option<Units>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current conditions for a city, postal code or coordinate pair
pub async fn get_current_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Value> {
    Ok(Json(state.weather_service.current(&query.city, query.units).await?))
}

/// Raw provider forecast
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Value> {
    Ok(Json(state.weather_service.forecast(&query.city, query.units).await?))
}

/// Five-day min/avg/max outlook
pub async fn get_daily_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Vec<DailySummary>> {
    Ok(Json(state.weather_service.daily(&query.city, query.units).await?))
}

/// Daily summaries for a date range within the forecast horizon
pub async fn get_weather_range(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<RangeReport> {
    let report = state
        .weather_service
        .range(&query.city, query.date_from, query.date_to, query.units, today())
        .await?;
    Ok(Json(report))
}

pub async fn summarize_weather(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<SummaryResponse> {
    let summary = state
        .weather_service
        .summarize(&request.city, &request.weather, &request.forecast)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn create_history(
    State(state): State<Arc<AppState>>,
    Json(record): Json<NewHistoryRecord>,
) -> ApiResult<Created> {
    let id = state.history_service.create(record).await?;
    Ok(Json(Created { id }))
}

pub async fn list_history(State(state): State<Arc<AppState>>) -> ApiResult<Vec<HistoryRecord>> {
    Ok(Json(state.history_service.list().await?))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<HistoryRecord> {
    Ok(Json(state.history_service.get(id).await?))
}

/// Re-fetch current conditions for a saved record and move it to today
pub async fn refresh_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<HistoryRecord> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let units = request.unit.unwrap_or_default();
    Ok(Json(state.history_service.refresh(id, units, today()).await?))
}

pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Detail> {
    state.history_service.delete(id).await?;
    Ok(Json(Detail::new("Record deleted successfully")))
}

/// Download a saved record as CSV
pub async fn export_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.history_service.export_csv(id).await {
        Ok((file_name, body)) => match csv_attachment(&file_name, body) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => e.into_response(),
    }
}
