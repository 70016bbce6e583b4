use std::sync::Arc;

use crate::config::Config;
use crate::db::Cache;
use crate::services::{
    GeminiProvider, GoogleImageEnricher, ImageEnricher, OpenAiProvider, PassthroughEnricher,
    RestaurantProvider, RestaurantSearchService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<RestaurantSearchService>,
}

impl AppState {
    pub fn new(search: RestaurantSearchService) -> Self {
        Self {
            search: Arc::new(search),
        }
    }

    /// Wires the OpenAI and Gemini providers and the image enricher from config
    pub fn from_config(config: &Config, cache: Cache) -> Self {
        let providers: Vec<Arc<dyn RestaurantProvider>> = vec![
            Arc::new(OpenAiProvider::new(
                cache.clone(),
                config.openai_api_key.clone(),
                config.openai_api_url.clone(),
                config.openai_model.clone(),
                config.restaurant_search_system_prompt.clone(),
            )),
            Arc::new(GeminiProvider::new(
                cache.clone(),
                config.gemini_api_key.clone(),
                config.gemini_api_url.clone(),
                config.gemini_model.clone(),
            )),
        ];

        let enricher: Arc<dyn ImageEnricher> = match config.google_image_credentials() {
            Some((api_key, engine_id)) => Arc::new(GoogleImageEnricher::new(
                cache,
                api_key.to_string(),
                engine_id.to_string(),
                config.google_custom_search_url.clone(),
            )),
            None => {
                tracing::warn!("Google Custom Search credentials not set, image backfill disabled");
                Arc::new(PassthroughEnricher)
            }
        };

        Self::new(RestaurantSearchService::new(
            providers,
            enricher,
            config.provider_timeout(),
        ))
    }
}
