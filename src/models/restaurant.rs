use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Identity of a restaurant search provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// OpenAI chat completions
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderId::OpenAi => write!(f, "openai"),
            ProviderId::Gemini => write!(f, "gemini"),
        }
    }
}

/// One restaurant search hit, in the JSON shape the AI providers return
///
/// Records are ephemeral: built fresh for every search, merged, enriched with
/// images and handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RestaurantRecord {
    /// Provider-assigned identifier, derived from name and city when missing
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "restaurant_name", alias = "name")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub google_maps_url: Option<String>,
    #[serde(default)]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub hours: Option<Hours>,
    /// Restaurant type (e.g. "Fine Dining", "Casual")
    #[serde(default, rename = "type")]
    pub restaurant_type: Option<String>,
    #[serde(default)]
    pub drinks: Option<Drinks>,
    #[serde(default)]
    pub diet_type: Option<String>,
    #[serde(default)]
    pub social_media: Option<SocialMedia>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_for: Vec<String>,
    /// Ordered image URLs
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl RestaurantRecord {
    /// Creates a record with only a name and city set
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        let name = name.into();
        let city = city.into();
        Self {
            id: Self::derive_id(&name, &city),
            name,
            city,
            ..Default::default()
        }
    }

    /// Builds an identifier from name and city, e.g. "bla_bla_dubai"
    pub fn derive_id(name: &str, city: &str) -> String {
        let base = if city.trim().is_empty() {
            name.trim().to_string()
        } else {
            format!("{} {}", name.trim(), city.trim())
        };
        base.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
    }

    /// Fills in a derived id when the provider did not supply one
    pub fn with_derived_id(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = Self::derive_id(&self.name, &self.city);
        }
        self
    }

    /// Replaces the image list
    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }
}

/// Operating hours per weekday
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Hours {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Drinks {
    #[serde(default)]
    pub serves_alcohol: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub special_drinks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SocialMedia {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub tiktok: Option<String>,
    pub tripadvisor: Option<String>,
}

/// Treats an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
