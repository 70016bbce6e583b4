/// OpenAI restaurant search provider
///
/// Sends a single chat completion in JSON mode and reads the restaurants out of
/// the assistant message.
///
/// API Flow:
/// 1. POST /v1/chat/completions with the configured system prompt and a
///    location-scoped user message
/// 2. choices[0].message.content → `{"restaurants": [...]}`
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ProviderId,
        ResponseFormat, RestaurantRecord,
    },
    services::providers::{ensure_query, parse_restaurants, RestaurantProvider, SEARCH_CACHE_TTL},
};
use reqwest::Client as HttpClient;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 4000;

#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    system_prompt: String,
    cache: Cache,
}

impl OpenAiProvider {
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        model: String,
        system_prompt: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            system_prompt,
            cache,
        }
    }

    /// Builds the chat completion request for one search
    fn build_request(
        model: &str,
        system_prompt: &str,
        query: &str,
        location: &str,
    ) -> ChatCompletionRequest {
        let user_message = format!(
            "Find restaurant: '{}' in {}. Only search for restaurants in {}, not other cities.",
            query, location, location
        );

        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_message),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        }
    }

    /// Pulls the assistant message text out of a completion
    fn completion_content(completion: ChatCompletionResponse) -> AppResult<String> {
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AppError::ExternalApi("OpenAI response contained no message content".to_string())
            })
    }
}

#[async_trait::async_trait]
impl RestaurantProvider for OpenAiProvider {
    async fn search(&self, query: &str, location: &str) -> AppResult<Vec<RestaurantRecord>> {
        ensure_query(query, location)?;

        cached!(
            self.cache,
            CacheKey::RestaurantSearch {
                provider: ProviderId::OpenAi,
                query: query.to_string(),
                location: location.to_string(),
            },
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/v1/chat/completions", self.api_url);
                let request = Self::build_request(&self.model, &self.system_prompt, query, location);

                let response = self
                    .http_client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "OpenAI API returned status {}: {}",
                        status, body
                    )));
                }

                let completion: ChatCompletionResponse = response.json().await?;
                let content = Self::completion_content(completion)?;
                tracing::debug!(response = %content, "Raw OpenAI response");

                let restaurants = parse_restaurants(&content)?;

                tracing::info!(
                    query = %query,
                    location = %location,
                    results = restaurants.len(),
                    provider = "openai",
                    "Restaurant search completed"
                );

                Ok(restaurants)
            }
        )
    }

    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }
}
