// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::history_service::HistoryService;
use crate::application::place_corrector::IdentityCorrector;
use crate::application::summarizer::TemplateSummarizer;
use crate::application::weather_provider::WeatherProvider;
use crate::application::weather_service::WeatherService;
use crate::infrastructure::cached_provider::CachedWeatherProvider;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::openweather_client::OpenWeatherClient;
use crate::infrastructure::sqlite_repository::SqliteHistoryRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_history, delete_history, export_history, get_current_weather, get_daily_forecast,
    get_forecast, get_history, get_weather_range, health_check, list_history, refresh_history,
    summarize_weather,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    if config.provider.api_key.is_empty() {
        tracing::warn!("No OpenWeather API key configured; provider requests will be rejected");
    }

    // Create adapters (infrastructure layer)
    let client = Arc::new(OpenWeatherClient::new(
        &config.provider.base_url,
        config.provider.api_key.clone(),
        config.provider.timeout(),
    )?);
    let provider: Arc<dyn WeatherProvider> =
        Arc::new(CachedWeatherProvider::new(client, config.provider.cache_ttl()));
    let repository = Arc::new(SqliteHistoryRepository::open(&config.storage.db_path)?);

    // Create services (application layer)
    let weather_service = WeatherService::new(
        provider,
        Arc::new(IdentityCorrector),
        Arc::new(TemplateSummarizer),
        config.provider.country_hint.clone(),
    );
    let history_service = HistoryService::new(repository, weather_service.clone());

    // Create application state
    let state = Arc::new(AppState {
        weather_service,
        history_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/weather/current", get(get_current_weather))
        .route("/weather/forecast", get(get_forecast))
        .route("/weather/daily", get(get_daily_forecast))
        .route("/weather/range", get(get_weather_range))
        .route("/weather/summary", post(summarize_weather))
        .route("/history", get(list_history).post(create_history))
        .route(
            "/history/:id",
            get(get_history).put(refresh_history).delete(delete_history),
        )
        .route("/history/:id/export", get(export_history))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {:?}", config.server.bind_addr))?;
    tracing::info!("Starting weather-history service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
