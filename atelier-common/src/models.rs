//! Domain entities served to page rendering
//!
//! Entities are constructed by the record validator in `atelier-site` and are
//! never mutated afterwards. Optional backend fields stay `None` when absent;
//! the slice accessors exist so callers can iterate without unwrapping.

use serde::{Deserialize, Serialize};

/// Hosted image reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    /// Absolute URL (checked by the validator)
    pub url: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Represented artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Backend record id
    pub id: String,
    pub name: String,
    pub speciality: Option<String>,
    pub bio: Option<String>,
    pub profile_images: Option<Vec<Attachment>>,
    pub artwork_images: Option<Vec<Attachment>>,
    /// Free-form social links text as entered in the backend
    pub social_links: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub banner_images: Option<Vec<Attachment>>,
    pub theme_primary_color: Option<String>,
    pub theme_background_color: Option<String>,
    pub theme_text_color: Option<String>,
    pub location: Option<String>,
}

impl Artist {
    /// Artist with only the required fields set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            speciality: None,
            bio: None,
            profile_images: None,
            artwork_images: None,
            social_links: None,
            tags: None,
            featured: None,
            banner_images: None,
            theme_primary_color: None,
            theme_background_color: None,
            theme_text_color: None,
            location: None,
        }
    }

    pub fn profile_images(&self) -> &[Attachment] {
        self.profile_images.as_deref().unwrap_or_default()
    }

    pub fn artworks(&self) -> &[Attachment] {
        self.artwork_images.as_deref().unwrap_or_default()
    }

    pub fn banner_images(&self) -> &[Attachment] {
        self.banner_images.as_deref().unwrap_or_default()
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }
}

/// Client review of one or more artists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    /// Referenced artist ids (weak references, never empty)
    pub artist_ids: Vec<String>,
    pub review_text: String,
    pub client_name: Option<String>,
    pub project_type: Option<String>,
    /// Date as entered in the backend
    pub date: String,
    pub featured: Option<bool>,
    pub approved: Option<bool>,
}

impl Review {
    pub fn mentions(&self, artist_id: &str) -> bool {
        self.artist_ids.iter().any(|id| id == artist_id)
    }
}

/// Commissionable service offered by one or more artists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Price range text, e.g. "$500 - $2,000"
    pub price_range: Option<String>,
    pub category: Option<String>,
    pub artist_ids: Vec<String>,
    pub featured: Option<bool>,
    pub image_url: Option<String>,
}

impl Service {
    pub fn offered_by(&self, artist_id: &str) -> bool {
        self.artist_ids.iter().any(|id| id == artist_id)
    }
}

/// Short labelled fact shown on an artist profile ("Experience: 10 years")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFact {
    pub id: String,
    pub artist_ids: Vec<String>,
    pub fact_type: Option<String>,
    pub fact_value: Option<String>,
    /// Icon image URL
    pub icon: Option<String>,
    /// Display position, ascending
    pub order: Option<i64>,
    pub featured: Option<bool>,
}

impl QuickFact {
    pub fn belongs_to(&self, artist_id: &str) -> bool {
        self.artist_ids.iter().any(|id| id == artist_id)
    }

    /// Built-in icon for facts without an icon URL, chosen from the fact type
    pub fn icon_kind(&self) -> FactIcon {
        FactIcon::for_fact_type(self.fact_type.as_deref().unwrap_or_default())
    }
}

/// Built-in quick fact icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactIcon {
    Experience,
    Status,
    Location,
    ResponseTime,
    Generic,
}

impl FactIcon {
    /// Keyword match on the lowercased fact type, first rule wins
    pub fn for_fact_type(fact_type: &str) -> Self {
        let lower = fact_type.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if has(&["experience", "years"]) {
            FactIcon::Experience
        } else if has(&["status", "available"]) {
            FactIcon::Status
        } else if has(&["location", "country"]) {
            FactIcon::Location
        } else if has(&["response", "time"]) {
            FactIcon::ResponseTime
        } else {
            FactIcon::Generic
        }
    }
}
