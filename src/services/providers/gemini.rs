/// Google Gemini restaurant search provider
///
/// Uses the public generateContent endpoint with an API key. The model answers
/// from its own knowledge and may wrap its JSON in a markdown fence, which
/// `parse_restaurants` strips.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        GeminiContent, GeminiPart, GenerateContentRequest, GenerateContentResponse,
        GenerationConfig, ProviderId, RestaurantRecord,
    },
    services::providers::{ensure_query, parse_restaurants, RestaurantProvider, SEARCH_CACHE_TTL},
};
use reqwest::Client as HttpClient;

/// Most restaurants requested from and kept per Gemini search
const RESULT_LIMIT: usize = 5;

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    cache: Cache,
}

impl GeminiProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            cache,
        }
    }

    fn build_request(query: &str, location: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(search_prompt(query, location, RESULT_LIMIT)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 8192,
            },
        }
    }
}

/// Prompt asking for up to `limit` restaurants in the shared JSON shape
fn search_prompt(query: &str, location: &str, limit: usize) -> String {
    format!(
        r#"You are a restaurant search assistant. Find restaurants matching the following criteria using your knowledge:

Restaurant Query: "{query}"
Location: {location}

INSTRUCTIONS:
1. Find restaurants in {location} that match the query "{query}"
2. Return up to {limit} real restaurants that exist (or are known to have existed) in {location}
3. For each restaurant, provide accurate details, contact information and operating hours if known
4. Only include image URLs you know to be real and publicly accessible. Never invent placeholder URLs; an empty array [] is fine.

Return the results in this exact JSON structure:
{{
  "restaurants": [
    {{
      "id": "unique_identifier_based_on_restaurant_name_and_city",
      "restaurant_name": "Full Restaurant Name",
      "description": "Detailed description of the restaurant",
      "google_maps_url": "https://www.google.com/maps/search/?api=1&query=restaurant+name+city",
      "website": "https://... or null",
      "menu_url": "https://... or null",
      "city": "{location}",
      "country": "Country name",
      "phone_number": "+XXX... or null",
      "hours": {{
        "monday": "HH:MM am/pm - HH:MM am/pm or Closed",
        "tuesday": "...",
        "wednesday": "...",
        "thursday": "...",
        "friday": "...",
        "saturday": "...",
        "sunday": "...",
        "timezone": "Timezone (e.g., Asia/Dubai)"
      }},
      "cuisine": "Cuisine type(s)",
      "type": "Restaurant type (e.g., Fine Dining, Casual, etc.)",
      "drinks": {{
        "serves_alcohol": true,
        "special_drinks": ["Drink 1", "Drink 2"]
      }},
      "diet_type": "mixed/vegetarian/vegan/etc.",
      "social_media": {{
        "instagram": "handle or null",
        "facebook": "url or null",
        "twitter": "handle or null",
        "tiktok": "handle or null",
        "tripadvisor": "url or null"
      }},
      "known_for": ["Highlight 1", "Highlight 2", "Highlight 3"],
      "images": ["real_image_url_1", "real_image_url_2"]
    }}
  ]
}}

If no restaurants found, return: {{"restaurants": []}}

Return only valid JSON."#
    )
}

#[async_trait::async_trait]
impl RestaurantProvider for GeminiProvider {
    async fn search(&self, query: &str, location: &str) -> AppResult<Vec<RestaurantRecord>> {
        ensure_query(query, location)?;

        cached!(
            self.cache,
            CacheKey::RestaurantSearch {
                provider: ProviderId::Gemini,
                query: query.to_string(),
                location: location.to_string(),
            },
            SEARCH_CACHE_TTL,
            async move {
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.api_url, self.model
                );

                let response = self
                    .http_client
                    .post(&url)
                    .query(&[("key", self.api_key.as_str())])
                    .json(&Self::build_request(query, location))
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "Gemini API returned status {}: {}",
                        status, body
                    )));
                }

                let generated: GenerateContentResponse = response.json().await?;
                let text = generated.text().ok_or_else(|| {
                    AppError::ExternalApi("Gemini response contained no text".to_string())
                })?;
                tracing::debug!(response = %text, "Raw Gemini response");

                let mut restaurants = parse_restaurants(&text)?;
                restaurants.truncate(RESULT_LIMIT);

                tracing::info!(
                    query = %query,
                    location = %location,
                    results = restaurants.len(),
                    provider = "gemini",
                    "Restaurant search completed"
                );

                Ok(restaurants)
            }
        )
    }

    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }
}
