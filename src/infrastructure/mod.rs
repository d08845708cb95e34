// Infrastructure layer - External dependencies and adapters
pub mod cached_provider;
pub mod config;
pub mod csv_export;
pub mod http_response;
pub mod openweather_client;
pub mod sqlite_repository;
