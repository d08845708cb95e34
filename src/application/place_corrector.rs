// Optional free-text place-name correction (e.g. fixing misspelled cities)
use crate::domain::location::{resolve, LocationQuery};
use async_trait::async_trait;

#[async_trait]
pub trait PlaceCorrector: Send + Sync {
    /// Return a corrected place name, or the input unchanged
    async fn correct(&self, text: &str) -> anyhow::Result<String>;
}

/// Corrector that leaves every name as typed.
#[derive(Debug, Clone, Default)]
pub struct IdentityCorrector;

#[async_trait]
impl PlaceCorrector for IdentityCorrector {
    async fn correct(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

/// Resolve `input`, passing place names through `corrector`.
///
/// A failing or blank correction keeps the original text.
pub async fn resolve_corrected(
    input: &str,
    country_hint: &str,
    corrector: &dyn PlaceCorrector,
) -> LocationQuery {
    match resolve(input, country_hint) {
        LocationQuery::PlaceName { text } if !text.is_empty() => {
            let corrected = match corrector.correct(&text).await {
                Ok(corrected) if !corrected.trim().is_empty() => corrected.trim().to_string(),
                Ok(_) => text,
                Err(e) => {
                    tracing::warn!("Place correction failed for {:?}: {}", text, e);
                    text
                }
            };
            LocationQuery::PlaceName { text: corrected }
        }
        other => other,
    }
}
