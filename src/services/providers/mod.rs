/// Restaurant search provider abstraction
///
/// This module provides a pluggable architecture for the AI backends that answer
/// restaurant searches (OpenAI, Gemini). Each provider turns a (query, location)
/// pair into a list of well-formed restaurant records.
use crate::{
    error::{AppError, AppResult},
    models::{ProviderId, RestaurantRecord},
};

pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// How long a provider's results stay cached
pub(crate) const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour

/// Trait for restaurant search providers
///
/// Implementations report failures as errors; isolating those failures from
/// the rest of a search is the dispatcher's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RestaurantProvider: Send + Sync {
    /// Search for restaurants matching `query` in `location`
    ///
    /// Every returned record has a non-blank name.
    async fn search(&self, query: &str, location: &str) -> AppResult<Vec<RestaurantRecord>>;

    /// Provider identity for logging, dispatch results and cache keys
    fn id(&self) -> ProviderId;
}

/// Parses a provider's `{"restaurants": [...]}` payload
///
/// Accepts payloads wrapped in a markdown code fence. A missing or non-array
/// `restaurants` field yields no results; entries that don't deserialize or
/// have a blank name are dropped.
pub fn parse_restaurants(raw: &str) -> AppResult<Vec<RestaurantRecord>> {
    let payload = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        tracing::error!(error = %e, response = %raw, "Failed to parse provider response");
        AppError::ExternalApi(format!("Invalid JSON in provider response: {}", e))
    })?;

    let entries = match value.get("restaurants") {
        Some(serde_json::Value::Array(entries)) => entries,
        Some(_) => {
            tracing::error!("Provider response 'restaurants' field is not a list");
            return Ok(Vec::new());
        }
        None => return Ok(Vec::new()),
    };

    let restaurants: Vec<RestaurantRecord> = entries
        .iter()
        .filter_map(|entry| {
            match serde_json::from_value::<RestaurantRecord>(canonical_name_key(entry)) {
                Ok(record) if !record.name.trim().is_empty() => Some(record.with_derived_id()),
                Ok(_) => {
                    tracing::debug!("Skipping restaurant with blank name");
                    None
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed restaurant entry");
                    None
                }
            }
        })
        .collect();

    if restaurants.len() < entries.len() {
        tracing::warn!(
            received = entries.len(),
            kept = restaurants.len(),
            "Dropped malformed restaurant entries"
        );
    }

    Ok(restaurants)
}

/// Keeps a single name key so entries carrying both spellings still deserialize
///
/// `restaurant_name` wins when it is a non-blank string, otherwise `name` does.
fn canonical_name_key(entry: &serde_json::Value) -> serde_json::Value {
    let mut entry = entry.clone();
    if let Some(fields) = entry.as_object_mut() {
        if fields.contains_key("restaurant_name") && fields.contains_key("name") {
            let canonical_usable = fields
                .get("restaurant_name")
                .and_then(|v| v.as_str())
                .is_some_and(|name| !name.trim().is_empty());
            if canonical_usable {
                fields.remove("name");
            } else {
                fields.remove("restaurant_name");
            }
        }
    }
    entry
}

/// Removes a leading ```json / ``` fence and anything after the closing fence
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"));

    match body {
        Some(body) => body.split("```").next().unwrap_or(body).trim(),
        None => trimmed,
    }
}

/// Rejects blank queries before any network call is made
pub(crate) fn ensure_query(query: &str, location: &str) -> AppResult<()> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    if location.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search location cannot be empty".to_string(),
        ));
    }
    Ok(())
}
