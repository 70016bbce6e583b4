pub mod dispatcher;
pub mod images;
pub mod merger;
pub mod providers;
pub mod search;
pub mod similarity;

pub use dispatcher::{dispatch, ProviderOutcome, ProviderResults};
pub use images::{is_valid_image_url, GoogleImageEnricher, ImageEnricher, PassthroughEnricher};
pub use merger::{has_real_image, merge_results, merge_tiers, MAX_RESULTS};
pub use providers::{parse_restaurants, GeminiProvider, OpenAiProvider, RestaurantProvider};
pub use search::{find_restaurants, validate_search_input, RestaurantSearchService};
pub use similarity::{is_duplicate, is_same_place, similarity};
