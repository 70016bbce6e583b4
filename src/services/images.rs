//! Image backfill for merged search results.
//!
//! Enrichment never fails a search: a record whose images cannot be fetched is
//! returned exactly as it came in.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CustomSearchResponse, RestaurantRecord},
};

const IMAGE_CACHE_TTL: u64 = 604800; // 1 week
const IMAGES_PER_RESTAURANT: usize = 3;
const SEARCH_RESULTS_REQUESTED: &str = "10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// Social media and profile pages rarely serve the image directly
const BLOCKED_URL_PATTERNS: [&str; 11] = [
    "instagram.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "tiktok.com",
    "youtube.com",
    "linkedin.com",
    "pinterest.com",
    "/profile/",
    "/user/",
    "/account/",
];

/// Fills in image URLs for search results
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageEnricher: Send + Sync {
    /// Returns the records in the same order, with images filled where possible
    async fn enrich(&self, records: Vec<RestaurantRecord>) -> Vec<RestaurantRecord>;
}

/// Enricher that leaves every record untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEnricher;

#[async_trait::async_trait]
impl ImageEnricher for PassthroughEnricher {
    async fn enrich(&self, records: Vec<RestaurantRecord>) -> Vec<RestaurantRecord> {
        records
    }
}

/// True for direct image links that are not social media or profile pages
pub fn is_valid_image_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }

    let url_lower = url.to_lowercase();

    if !IMAGE_EXTENSIONS.iter().any(|ext| url_lower.contains(ext)) {
        return false;
    }

    if BLOCKED_URL_PATTERNS
        .iter()
        .any(|pattern| url_lower.contains(pattern))
    {
        tracing::debug!(url = %url, "Filtered out social media image URL");
        return false;
    }

    true
}

/// Image backfill through the Google Custom Search image API
#[derive(Clone)]
pub struct GoogleImageEnricher {
    http_client: HttpClient,
    api_key: String,
    search_engine_id: String,
    api_url: String,
    cache: Cache,
}

impl GoogleImageEnricher {
    pub fn new(cache: Cache, api_key: String, search_engine_id: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            search_engine_id,
            api_url,
            cache,
        }
    }

    async fn enrich_one(&self, mut record: RestaurantRecord) -> RestaurantRecord {
        let valid: Vec<String> = record
            .images
            .iter()
            .filter(|url| is_valid_image_url(url))
            .cloned()
            .collect();

        if !valid.is_empty() {
            tracing::debug!(
                name = %record.name,
                images = valid.len(),
                "Reusing existing valid images"
            );
            record.images = valid;
            return record;
        }

        if record.name.trim().is_empty() || record.city.trim().is_empty() {
            tracing::warn!(name = %record.name, "Missing name or city, cannot fetch images");
            return record;
        }

        match self.fetch_images(&record.name, &record.city).await {
            Ok(images) => {
                record.images = images;
            }
            Err(e) => {
                tracing::warn!(
                    name = %record.name,
                    city = %record.city,
                    error = %e,
                    "Image lookup failed, keeping record unchanged"
                );
            }
        }

        record
    }

    /// Up to three valid image URLs for a restaurant, cached per name and city
    async fn fetch_images(&self, name: &str, city: &str) -> AppResult<Vec<String>> {
        cached!(
            self.cache,
            CacheKey::RestaurantImages {
                name: name.to_string(),
                city: city.to_string(),
            },
            IMAGE_CACHE_TTL,
            async move {
                let query = format!("{} {} restaurant food", name, city);

                let response = self
                    .http_client
                    .get(&self.api_url)
                    .timeout(REQUEST_TIMEOUT)
                    .query(&[
                        ("key", self.api_key.as_str()),
                        ("cx", self.search_engine_id.as_str()),
                        ("searchType", "image"),
                        ("q", query.as_str()),
                        ("num", SEARCH_RESULTS_REQUESTED),
                        ("safe", "active"),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "Custom Search API returned status {}: {}",
                        status, body
                    )));
                }

                let results: CustomSearchResponse = response.json().await?;
                let candidates = results.items.len();
                let images = select_images(results);

                tracing::info!(
                    name = %name,
                    city = %city,
                    images = images.len(),
                    candidates,
                    "Fetched restaurant images"
                );

                Ok(images)
            }
        )
    }
}

/// First few valid image links of a Custom Search response
fn select_images(results: CustomSearchResponse) -> Vec<String> {
    results
        .items
        .into_iter()
        .filter_map(|item| item.link)
        .filter(|link| is_valid_image_url(link))
        .take(IMAGES_PER_RESTAURANT)
        .collect()
}

#[async_trait::async_trait]
impl ImageEnricher for GoogleImageEnricher {
    async fn enrich(&self, records: Vec<RestaurantRecord>) -> Vec<RestaurantRecord> {
        join_all(records.into_iter().map(|record| self.enrich_one(record))).await
    }
}
