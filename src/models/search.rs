use serde::{Deserialize, Serialize};

use super::{ProviderId, RestaurantRecord};

/// Which providers a restaurant search consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SearchMode {
    /// OpenAI only
    OpenAi = 1,
    /// Gemini only
    Gemini = 2,
    /// Gemini results first, supplemented by OpenAI
    #[default]
    Hybrid = 3,
}

impl SearchMode {
    /// Providers to consult, highest priority tier first
    pub fn tiers(self) -> &'static [ProviderId] {
        match self {
            SearchMode::OpenAi => &[ProviderId::OpenAi],
            SearchMode::Gemini => &[ProviderId::Gemini],
            SearchMode::Hybrid => &[ProviderId::Gemini, ProviderId::OpenAi],
        }
    }
}

impl TryFrom<u8> for SearchMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SearchMode::OpenAi),
            2 => Ok(SearchMode::Gemini),
            3 => Ok(SearchMode::Hybrid),
            other => Err(format!("invalid search mode {}, expected 1, 2 or 3", other)),
        }
    }
}

impl From<SearchMode> for u8 {
    fn from(mode: SearchMode) -> Self {
        mode as u8
    }
}

/// Request body for restaurant search
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantSearchRequest {
    /// Restaurant name or free-form query (e.g. "sushi", "Bla Bla")
    pub query: String,
    /// City or area to search in (e.g. "Dubai")
    pub location: String,
    #[serde(default)]
    pub mode: SearchMode,
}

/// Response with 0-5 merged restaurants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantSearchResponse {
    pub restaurants: Vec<RestaurantRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_defaults_to_hybrid() {
        let request: RestaurantSearchRequest =
            serde_json::from_str(r#"{"query": "sushi", "location": "Dubai"}"#).unwrap();
        assert_eq!(request.mode, SearchMode::Hybrid);
    }

    #[test]
    fn test_search_mode_from_integer() {
        let request: RestaurantSearchRequest =
            serde_json::from_str(r#"{"query": "sushi", "location": "Dubai", "mode": 1}"#)
                .unwrap();
        assert_eq!(request.mode, SearchMode::OpenAi);
    }

    #[test]
    fn test_search_mode_rejects_out_of_range() {
        let result = serde_json::from_str::<RestaurantSearchRequest>(
            r#"{"query": "sushi", "location": "Dubai", "mode": 4}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_search_mode_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&SearchMode::Gemini).unwrap(), "2");
    }

    #[test]
    fn test_hybrid_tiers_put_gemini_first() {
        assert_eq!(
            SearchMode::Hybrid.tiers(),
            &[ProviderId::Gemini, ProviderId::OpenAi]
        );
        assert_eq!(SearchMode::OpenAi.tiers(), &[ProviderId::OpenAi]);
    }
}
