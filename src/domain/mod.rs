// Domain layer - Pure weather types and algorithms
pub mod forecast;
pub mod history;
pub mod location;
