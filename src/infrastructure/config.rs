use serde::Deserialize;
use std::time::Duration;

use super::openweather_client::DEFAULT_BASE_URL;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub country_hint: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub db_path: String,
}

/// Load settings from defaults, `config/weather.*` (optional) and the environment.
///
/// Environment overrides use `WEATHER__<SECTION>__<KEY>`; `OPENWEATHER_API_KEY`
/// also sets the provider key.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    build_app_config(
        config::File::with_name("config/weather").required(false),
        std::env::var("OPENWEATHER_API_KEY").ok(),
    )
}

fn build_app_config(
    file: config::File<config::FileSourceFile, config::FileFormat>,
    api_key: Option<String>,
) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8000")?
        .set_default("provider.base_url", DEFAULT_BASE_URL)?
        .set_default("provider.api_key", "")?
        .set_default("provider.country_hint", "us")?
        .set_default("provider.timeout_secs", 10)?
        .set_default("provider.cache_ttl_secs", 60)?
        .set_default("storage.db_path", "weather_app.db")?
        .add_source(file)
        .set_override_option("provider.api_key", api_key)?
        .add_source(
            config::Environment::with_prefix("WEATHER")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
