use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{RestaurantRecord, SearchMode},
};

use super::{
    dispatcher::dispatch, images::ImageEnricher, merger::merge_tiers,
    providers::RestaurantProvider,
};

const MAX_QUERY_CHARS: usize = 200;
const MIN_LOCATION_CHARS: usize = 2;
const MAX_LOCATION_CHARS: usize = 100;

/// Checks caller input before any provider is contacted
pub fn validate_search_input(query: &str, location: &str) -> AppResult<()> {
    let query = query.trim();
    let location = location.trim();

    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Search query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let location_chars = location.chars().count();
    if location_chars < MIN_LOCATION_CHARS || location_chars > MAX_LOCATION_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Search location must be between {} and {} characters",
            MIN_LOCATION_CHARS, MAX_LOCATION_CHARS
        )));
    }

    Ok(())
}

/// Searches the providers in priority order and returns at most five restaurants
///
/// Provider failures only reduce the number of results; the only error is
/// invalid caller input.
pub async fn find_restaurants(
    query: &str,
    location: &str,
    providers: &[Arc<dyn RestaurantProvider>],
    enricher: &dyn ImageEnricher,
    provider_timeout: Duration,
) -> AppResult<Vec<RestaurantRecord>> {
    validate_search_input(query, location)?;
    let query = query.trim();
    let location = location.trim();

    let results = dispatch(providers, query, location, provider_timeout).await;
    let tiers = results.into_iter().map(|r| r.restaurants).collect();
    let merged = merge_tiers(tiers);

    if merged.is_empty() {
        return Ok(merged);
    }

    Ok(enricher.enrich(merged).await)
}

/// Restaurant search over the configured providers, selected per request by mode
pub struct RestaurantSearchService {
    providers: Vec<Arc<dyn RestaurantProvider>>,
    enricher: Arc<dyn ImageEnricher>,
    provider_timeout: Duration,
}

impl RestaurantSearchService {
    pub fn new(
        providers: Vec<Arc<dyn RestaurantProvider>>,
        enricher: Arc<dyn ImageEnricher>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            enricher,
            provider_timeout,
        }
    }

    /// Providers for a mode, highest priority first
    ///
    /// A mode that names an unconfigured provider simply skips it.
    fn tiers_for(&self, mode: SearchMode) -> Vec<Arc<dyn RestaurantProvider>> {
        mode.tiers()
            .iter()
            .filter_map(|id| {
                let provider = self.providers.iter().find(|p| p.id() == *id).cloned();
                if provider.is_none() {
                    tracing::warn!(provider = %id, "Search mode names an unconfigured provider");
                }
                provider
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        location: &str,
        mode: SearchMode,
    ) -> AppResult<Vec<RestaurantRecord>> {
        let tiers = self.tiers_for(mode);

        let restaurants = find_restaurants(
            query,
            location,
            &tiers,
            self.enricher.as_ref(),
            self.provider_timeout,
        )
        .await?;

        tracing::info!(results = restaurants.len(), "Restaurant search finished");

        Ok(restaurants)
    }
}
