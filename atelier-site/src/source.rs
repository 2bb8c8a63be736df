//! Page data sources
//!
//! Pages read through [`DataSource`] rather than the data access layer
//! directly. [`WithFallback`] decides in one place when sample content stands
//! in for an empty backend result.

use crate::data_access::DataAccessContext;
use crate::fallback;
use async_trait::async_trait;
use atelier_common::config::DataConfig;
use atelier_common::{Artist, QuickFact, Review, Service};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Read operations available to page loaders
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn artists(&self, featured_only: bool) -> Vec<Artist>;

    async fn artist(&self, id: &str) -> Option<Artist>;

    async fn artists_by_ids(&self, ids: &[String]) -> Vec<Artist>;

    async fn tags(&self) -> Vec<String>;

    async fn reviews(&self, artist_id: &str) -> Vec<Review>;

    async fn services(&self, artist_id: &str) -> Vec<Service>;

    async fn quick_facts(&self, artist_id: &str) -> Vec<QuickFact>;
}

/// Backend data through a [`DataAccessContext`]
#[derive(Clone)]
pub struct LiveSource {
    context: Arc<DataAccessContext>,
}

impl LiveSource {
    pub fn new(context: Arc<DataAccessContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DataSource for LiveSource {
    async fn artists(&self, featured_only: bool) -> Vec<Artist> {
        self.context.list_artists(featured_only).await
    }

    async fn artist(&self, id: &str) -> Option<Artist> {
        self.context.get_artist_by_id(id).await
    }

    async fn artists_by_ids(&self, ids: &[String]) -> Vec<Artist> {
        self.context.list_artists_by_ids(ids).await
    }

    async fn tags(&self) -> Vec<String> {
        self.context.list_all_tags().await
    }

    async fn reviews(&self, artist_id: &str) -> Vec<Review> {
        self.context.list_artist_reviews(artist_id).await
    }

    async fn services(&self, artist_id: &str) -> Vec<Service> {
        self.context.list_artist_services(artist_id).await
    }

    async fn quick_facts(&self, artist_id: &str) -> Vec<QuickFact> {
        self.context.list_artist_quick_facts(artist_id).await
    }
}

/// Built-in sample content
///
/// Only artists (and their tags) have samples; related tables are empty.
#[derive(Debug, Clone)]
pub struct FallbackSource {
    artists: Vec<Artist>,
}

impl FallbackSource {
    pub fn new() -> Self {
        Self {
            artists: fallback::sample_artists(),
        }
    }
}

impl Default for FallbackSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for FallbackSource {
    /// Featured samples keep their curated order; the full list is by name
    async fn artists(&self, featured_only: bool) -> Vec<Artist> {
        let mut artists: Vec<Artist> = self
            .artists
            .iter()
            .filter(|a| !featured_only || a.is_featured())
            .cloned()
            .collect();
        if !featured_only {
            artists.sort_by(|a, b| a.name.cmp(&b.name));
        }
        artists
    }

    async fn artist(&self, id: &str) -> Option<Artist> {
        self.artists.iter().find(|a| a.id == id).cloned()
    }

    async fn artists_by_ids(&self, ids: &[String]) -> Vec<Artist> {
        self.artists
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect()
    }

    async fn tags(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.artists.iter().flat_map(|a| a.tags()).collect();
        tags.into_iter().cloned().collect()
    }

    async fn reviews(&self, _artist_id: &str) -> Vec<Review> {
        Vec::new()
    }

    async fn services(&self, _artist_id: &str) -> Vec<Service> {
        Vec::new()
    }

    async fn quick_facts(&self, _artist_id: &str) -> Vec<QuickFact> {
        Vec::new()
    }
}

/// Reads `primary`, substituting `fallback` when the result is empty or absent
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P: DataSource, F: DataSource> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

macro_rules! or_fallback {
    ($self:ident, $op:literal, $method:ident ( $($arg:expr),* )) => {{
        let primary = $self.primary.$method($($arg),*).await;
        if primary.is_empty() {
            info!(operation = $op, "Primary source returned nothing, using fallback data");
            $self.fallback.$method($($arg),*).await
        } else {
            primary
        }
    }};
}

#[async_trait]
impl<P: DataSource, F: DataSource> DataSource for WithFallback<P, F> {
    async fn artists(&self, featured_only: bool) -> Vec<Artist> {
        or_fallback!(self, "artists", artists(featured_only))
    }

    async fn artist(&self, id: &str) -> Option<Artist> {
        match self.primary.artist(id).await {
            Some(artist) => Some(artist),
            None => self.fallback.artist(id).await,
        }
    }

    async fn artists_by_ids(&self, ids: &[String]) -> Vec<Artist> {
        or_fallback!(self, "artists_by_ids", artists_by_ids(ids))
    }

    async fn tags(&self) -> Vec<String> {
        or_fallback!(self, "tags", tags())
    }

    async fn reviews(&self, artist_id: &str) -> Vec<Review> {
        or_fallback!(self, "reviews", reviews(artist_id))
    }

    async fn services(&self, artist_id: &str) -> Vec<Service> {
        or_fallback!(self, "services", services(artist_id))
    }

    async fn quick_facts(&self, artist_id: &str) -> Vec<QuickFact> {
        or_fallback!(self, "quick_facts", quick_facts(artist_id))
    }
}

/// Source over `context`, wrapped with sample data when
/// `fallback_data` is on
pub fn build_source(context: Arc<DataAccessContext>, config: &DataConfig) -> Arc<dyn DataSource> {
    let live = LiveSource::new(context);

    if config.fallback_data {
        Arc::new(WithFallback::new(live, FallbackSource::new()))
    } else {
        Arc::new(live)
    }
}
