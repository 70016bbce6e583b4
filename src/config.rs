use serde::Deserialize;
use std::time::Duration;

/// Default instructions sent to the OpenAI provider
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a restaurant information expert with real-time web search capabilities.

When given a restaurant search query and a location, use web search to find accurate, up-to-date information for restaurants ONLY in the specified location. Do NOT return restaurants from other cities or countries.

Return ONLY valid JSON (no markdown, no explanations, no code blocks).

Return an array of restaurants (up to 5 matches) in this exact structure:
{
  "restaurants": [
    {
      "id": "unique_identifier",
      "restaurant_name": "Full Restaurant Name",
      "description": "Detailed description",
      "google_maps_url": "https://www.google.com/maps/search/?api=1&query=...",
      "website": "https://...",
      "menu_url": "https://... or null",
      "city": "City Name",
      "country": "Country Name",
      "phone_number": "+XXX ... or null",
      "hours": {
        "monday": "HH:MM am/pm - HH:MM am/pm or Closed",
        "tuesday": "...",
        "wednesday": "...",
        "thursday": "...",
        "friday": "...",
        "saturday": "...",
        "sunday": "...",
        "timezone": "Timezone (e.g., Asia/Dubai)"
      },
      "cuisine": "Cuisine type(s)",
      "type": "Restaurant type (e.g., Fine Dining, Casual, Fast Food, etc.)",
      "drinks": {
        "serves_alcohol": true,
        "special_drinks": ["Specialty drink 1", "Specialty drink 2"]
      },
      "diet_type": "mixed/vegetarian/vegan/gluten-free/etc.",
      "social_media": {
        "instagram": "handle or null",
        "facebook": "url or null",
        "twitter": "handle or null",
        "tiktok": "handle or null",
        "tripadvisor": "url or null"
      },
      "known_for": ["Highlight 1", "Highlight 2", "Highlight 3"],
      "images": ["real_image_url_1", "real_image_url_2"]
    }
  ]
}

Images must be REAL, publicly accessible direct image URLs (.jpg, .jpeg, .png, .webp) of the restaurant, its food or its interior. If none can be found, return an empty array []. Never invent placeholder or example URLs.

If no restaurants found, return: {"restaurants": []}
"#;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// OpenAI API key
    pub openai_api_key: String,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// OpenAI chat model
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Gemini model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Google Custom Search API key, image backfill is disabled without it
    #[serde(default)]
    pub google_custom_search_api_key: Option<String>,

    /// Google Custom Search engine id (cx)
    #[serde(default)]
    pub google_custom_search_engine_id: Option<String>,

    /// Google Custom Search endpoint
    #[serde(default = "default_google_custom_search_url")]
    pub google_custom_search_url: String,

    /// System prompt for the OpenAI provider
    #[serde(default = "default_system_prompt")]
    pub restaurant_search_system_prompt: String,

    /// Per-provider search timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Comma-separated allowed origins, or "*"
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_google_custom_search_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Custom Search key and engine id, when both are set and non-blank
    pub fn google_image_credentials(&self) -> Option<(&str, &str)> {
        let api_key = self.google_custom_search_api_key.as_deref()?.trim();
        let engine_id = self.google_custom_search_engine_id.as_deref()?.trim();
        if api_key.is_empty() || engine_id.is_empty() {
            return None;
        }
        Some((api_key, engine_id))
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
