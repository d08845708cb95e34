// Application layer - Use cases and collaborator traits
pub mod error;
pub mod history_repository;
pub mod history_service;
pub mod place_corrector;
pub mod summarizer;
pub mod weather_provider;
pub mod weather_service;
