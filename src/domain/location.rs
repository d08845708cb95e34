// Location domain model - Free-text location classification
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static COORDINATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+(\.[0-9]+)?\s*,\s*-?[0-9]+(\.[0-9]+)?$").expect("valid coordinate pattern")
});

/// A location ready to be submitted to a weather provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationQuery {
    Coordinates { lat: String, lon: String },
    PostalCode { code: String, country_hint: String },
    PlaceName { text: String },
}

impl LocationQuery {
    /// Query parameters understood by OpenWeather-style endpoints.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Coordinates { lat, lon } => vec![("lat", lat.clone()), ("lon", lon.clone())],
            Self::PostalCode { code, country_hint } => {
                vec![("zip", format!("{},{}", code, country_hint))]
            }
            Self::PlaceName { text } => vec![("q", text.clone())],
        }
    }

    /// Stable key used for memoizing provider responses.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Coordinates { lat, lon } => format!("coord:{},{}", lat, lon),
            Self::PostalCode { code, country_hint } => format!("zip:{},{}", code, country_hint),
            Self::PlaceName { text } => format!("q:{}", text.to_lowercase()),
        }
    }
}

/// Classify free text as coordinates, a postal code, or a place name.
///
/// Total: every input maps to a variant. An empty (or blank) input becomes
/// an empty `PlaceName`; callers reject that before reaching the provider.
pub fn resolve(input: &str, country_hint: &str) -> LocationQuery {
    let input = input.trim();

    if COORDINATE_PATTERN.is_match(input) {
        if let Some((lat, lon)) = input.split_once(',') {
            return LocationQuery::Coordinates {
                lat: lat.trim().to_string(),
                lon: lon.trim().to_string(),
            };
        }
    }

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return LocationQuery::PostalCode {
            code: input.to_string(),
            country_hint: country_hint.to_string(),
        };
    }

    LocationQuery::PlaceName {
        text: input.to_string(),
    }
}
