//! Page data loaders
//!
//! Each loader gathers everything one page needs, racing the combined fetch
//! against a fixed deadline. The fetch runs as its own task: when the deadline
//! wins, the task is detached and finishes in the background, and the page is
//! built from fallback or empty data instead.

use crate::fallback;
use crate::source::DataSource;
use atelier_common::color::{optimal_text_color, TextPalette};
use atelier_common::{Artist, Attachment, FactIcon, QuickFact, Review, Service};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Deadline for the home page fetch
pub const HOME_DEADLINE: Duration = Duration::from_secs(10);

/// Deadline for the artists index and profile fetches
pub const PAGE_DEADLINE: Duration = Duration::from_secs(15);

const DEFAULT_PRIMARY_COLOR: &str = "#00ff9d";
const DEFAULT_BACKGROUND_COLOR: &str = "#0E0E0E";
const DEFAULT_TEXT_COLOR: &str = "#E5E5E5";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub featured_artists: Vec<Artist>,
    /// Artworks of the featured artists, in artist order
    pub artworks: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistsIndexPage {
    pub artists: Vec<Artist>,
    pub tags: Vec<String>,
}

/// One row of the quick facts panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactEntry {
    pub label: String,
    pub value: String,
    pub icon: FactIcon,
    /// Custom icon image; `icon` is shown when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl FactEntry {
    fn from_fact(fact: &QuickFact) -> Self {
        Self {
            label: fact.fact_type.clone().unwrap_or_default(),
            value: fact.fact_value.clone().unwrap_or_default(),
            icon: fact.icon_kind(),
            icon_url: fact.icon.clone(),
        }
    }

    fn defaults() -> Vec<Self> {
        fallback::DEFAULT_QUICK_FACTS
            .iter()
            .map(|(label, value)| Self {
                label: label.to_string(),
                value: value.to_string(),
                icon: FactIcon::for_fact_type(label),
                icon_url: None,
            })
            .collect()
    }
}

/// Colors resolved for an artist profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileTheme {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    /// Readable text over the primary color
    pub on_primary: TextPalette,
}

impl ProfileTheme {
    fn for_artist(artist: &Artist) -> Self {
        let primary_color = color_or(&artist.theme_primary_color, DEFAULT_PRIMARY_COLOR);
        // Measured against the color actually rendered, default included
        let on_primary = optimal_text_color(&primary_color);
        Self {
            primary_color,
            background_color: color_or(&artist.theme_background_color, DEFAULT_BACKGROUND_COLOR),
            text_color: color_or(&artist.theme_text_color, DEFAULT_TEXT_COLOR),
            on_primary,
        }
    }
}

fn color_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfilePage {
    pub artist: Artist,
    pub reviews: Vec<Review>,
    pub services: Vec<Service>,
    pub quick_facts: Vec<FactEntry>,
    pub theme: ProfileTheme,
}

/// Result of loading a page that can be missing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "page", rename_all = "snake_case")]
pub enum PageOutcome<T> {
    Ready(T),
    NotFound,
}

/// Builds page data from a [`DataSource`]
#[derive(Clone)]
pub struct PageLoader {
    source: Arc<dyn DataSource>,
    fallback_on_timeout: bool,
}

impl PageLoader {
    pub fn new(source: Arc<dyn DataSource>, fallback_on_timeout: bool) -> Self {
        Self {
            source,
            fallback_on_timeout,
        }
    }

    /// Featured artists and their artworks
    ///
    /// On timeout the sample artists are shown (when fallback data is on).
    pub async fn load_home(&self) -> HomePage {
        let source = Arc::clone(&self.source);
        let featured = within_deadline("home", HOME_DEADLINE, async move {
            source.artists(true).await
        })
        .await;

        match featured {
            Some(featured_artists) => {
                let artworks = featured_artists
                    .iter()
                    .flat_map(|a| a.artworks().iter().cloned())
                    .collect();
                HomePage {
                    featured_artists,
                    artworks,
                }
            }
            None if self.fallback_on_timeout => {
                info!("Using fallback data for home page");
                HomePage {
                    featured_artists: fallback::sample_artists(),
                    artworks: fallback::sample_artworks(),
                }
            }
            None => HomePage {
                featured_artists: Vec::new(),
                artworks: Vec::new(),
            },
        }
    }

    /// All artists with the tag list; empty on timeout
    pub async fn load_artists_index(&self) -> ArtistsIndexPage {
        let source = Arc::clone(&self.source);
        let loaded = within_deadline("artists_index", PAGE_DEADLINE, async move {
            tokio::join!(source.artists(false), source.tags())
        })
        .await;

        match loaded {
            Some((artists, tags)) => ArtistsIndexPage { artists, tags },
            None => ArtistsIndexPage::default(),
        }
    }

    /// Artist profile with reviews, services and quick facts
    ///
    /// An absent artist and a timeout both map to [`PageOutcome::NotFound`].
    pub async fn load_artist_profile(&self, artist_id: &str) -> PageOutcome<ArtistProfilePage> {
        let source = Arc::clone(&self.source);
        let id = artist_id.to_string();
        let loaded = within_deadline("artist_profile", PAGE_DEADLINE, async move {
            let (artist, reviews, services, facts) = tokio::join!(
                source.artist(&id),
                source.reviews(&id),
                source.services(&id),
                source.quick_facts(&id),
            );
            artist.map(|artist| (artist, reviews, services, facts))
        })
        .await
        .flatten();

        let Some((artist, reviews, services, facts)) = loaded else {
            info!(artist_id = %artist_id, "Artist profile not found");
            return PageOutcome::NotFound;
        };

        let quick_facts = if facts.is_empty() {
            FactEntry::defaults()
        } else {
            facts.iter().map(FactEntry::from_fact).collect()
        };

        PageOutcome::Ready(ArtistProfilePage {
            theme: ProfileTheme::for_artist(&artist),
            artist,
            reviews,
            services,
            quick_facts,
        })
    }
}

/// Run `fetch` as a task and wait for it up to `deadline`
///
/// `None` on timeout or task failure. A timed-out task keeps running.
async fn within_deadline<T, F>(page: &'static str, deadline: Duration, fetch: F) -> Option<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let handle = tokio::spawn(fetch);

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!(page = page, "Page data task failed: {}", e);
            None
        }
        Err(_) => {
            warn!(page = page, deadline = ?deadline, "Page data load timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_common::color::{contrast_ratio_hex, BLACK, WCAG_AA};

    #[test]
    fn test_default_facts_get_icons() {
        let facts = FactEntry::defaults();
        let icons: Vec<FactIcon> = facts.iter().map(|f| f.icon).collect();
        assert_eq!(
            icons,
            vec![
                FactIcon::Experience,
                FactIcon::Status,
                FactIcon::Location,
                FactIcon::ResponseTime
            ]
        );
        assert_eq!(facts[3].value, "Within 24 hours");
    }

    #[test]
    fn test_theme_defaults_for_bare_artist() {
        let theme = ProfileTheme::for_artist(&Artist::new("rec1", "Solo"));
        assert_eq!(theme.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(theme.background_color, DEFAULT_BACKGROUND_COLOR);
        assert_eq!(theme.on_primary.text_color, BLACK);
        assert!(theme.on_primary.is_accessible);
    }

    #[test]
    fn test_text_on_default_primary_meets_aa() {
        let theme = ProfileTheme::for_artist(&Artist::new("rec1", "Solo"));
        let measured =
            contrast_ratio_hex(&theme.primary_color, &theme.on_primary.text_color).unwrap();
        assert!(measured >= WCAG_AA, "measured {measured}");
        assert!((measured - theme.on_primary.contrast_ratio).abs() < 1e-9);
    }

    #[test]
    fn test_blank_primary_uses_default_for_text_choice() {
        let artist = Artist {
            theme_primary_color: Some("  ".into()),
            ..Artist::new("rec1", "Solo")
        };
        let theme = ProfileTheme::for_artist(&artist);
        assert_eq!(theme.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(theme.on_primary.text_color, BLACK);
    }

    #[test]
    fn test_theme_uses_accessible_text_on_primary() {
        let artist = Artist {
            theme_primary_color: Some("#17624A".into()),
            ..Artist::new("rec1", "Solo")
        };
        let theme = ProfileTheme::for_artist(&artist);
        assert_eq!(theme.primary_color, "#17624A");
        assert!(theme.on_primary.is_accessible);
    }

    #[test]
    fn test_not_found_serializes_with_status() {
        let outcome: PageOutcome<HomePage> = PageOutcome::NotFound;
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "not_found");
    }
}
