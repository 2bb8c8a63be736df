//! Data access layer
//!
//! The only code that talks to the backend. Each read goes
//! cache → throttle → backend → validation → cache, and every failure is
//! logged and turned into an empty or absent result.
//!
//! The `try_*` variants surface [`BackendError`] for callers (and tests) that
//! need to tell "nothing there" from "backend down".

use crate::airtable::{
    AirtableClient, Backend, BackendError, Filter, RawRecord, SelectQuery, SortDirection, Table,
    UnconfiguredBackend,
};
use crate::cache::{normalize_ids, CacheKey, CachePayload, ResponseCache};
use crate::throttle::RequestThrottle;
use crate::validation::{extract_tags, validate_batch, Validate, ValidationOptions};
use atelier_common::config::{resolve_credentials, BatchPolicy, DataConfig, TomlConfig};
use atelier_common::{Artist, QuickFact, Review, Service};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Behaviour switches for a data access context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataAccessOptions {
    pub batch_policy: BatchPolicy,
    pub validation: ValidationOptions,
}

impl DataAccessOptions {
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            batch_policy: config.batch_policy,
            validation: ValidationOptions {
                legacy_relation_fields: config.legacy_relation_fields,
            },
        }
    }
}

/// Backend handle plus the cache and throttle shared by all its reads
pub struct DataAccessContext {
    backend: Arc<dyn Backend>,
    cache: ResponseCache,
    throttle: RequestThrottle,
    options: DataAccessOptions,
}

impl DataAccessContext {
    pub fn new(backend: Arc<dyn Backend>, options: DataAccessOptions) -> Self {
        Self {
            backend,
            cache: ResponseCache::new(),
            throttle: RequestThrottle::default(),
            options,
        }
    }

    /// Build from loaded configuration
    ///
    /// Missing credentials are not fatal: the context is built over an
    /// [`UnconfiguredBackend`] and every read comes back empty.
    pub fn from_config(config: &TomlConfig) -> Self {
        let backend: Arc<dyn Backend> = match resolve_credentials(config) {
            Ok(credentials) => match AirtableClient::new(credentials, &config.airtable) {
                Ok(client) => {
                    info!(api_url = %config.airtable.api_url, "Backend client ready");
                    Arc::new(client)
                }
                Err(e) => {
                    warn!("Failed to create backend client: {}", e);
                    Arc::new(UnconfiguredBackend::new(e.to_string()))
                }
            },
            Err(e) => {
                warn!("{}", e);
                Arc::new(UnconfiguredBackend::new(e.to_string()))
            }
        };

        Self::new(backend, DataAccessOptions::from_config(&config.data))
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    async fn fetch(&self, table: Table, query: &SelectQuery) -> Result<Vec<RawRecord>, BackendError> {
        self.throttle.acquire().await;
        self.backend.select(table, query).await
    }

    fn validate_all<T: Validate>(&self, records: &[RawRecord]) -> Vec<T> {
        validate_batch(records, self.options.batch_policy, &self.options.validation).valid
    }

    // ------------------------------------------------------------------
    // Artists
    // ------------------------------------------------------------------

    /// All artists sorted by name, or featured artists in shuffled order
    ///
    /// The featured shuffle happens before caching, so the order is stable
    /// until the entry expires.
    pub async fn list_artists(&self, featured_only: bool) -> Vec<Artist> {
        self.try_list_artists(featured_only)
            .await
            .unwrap_or_else(|e| log_failure("list_artists", &e))
    }

    pub async fn try_list_artists(&self, featured_only: bool) -> Result<Vec<Artist>, BackendError> {
        let key = CacheKey::Artists { featured_only };
        if let Some(CachePayload::Artists(artists)) = self.cache.get(&key).await.as_deref() {
            return Ok(artists.clone());
        }

        let mut query = SelectQuery::all().sort_by("Name", SortDirection::Asc);
        if featured_only {
            query = query.filter(Filter::FeaturedOnly);
        }

        let records = self.fetch(Table::Artists, &query).await?;
        let mut artists: Vec<Artist> = self.validate_all(&records);

        if featured_only {
            artists.shuffle(&mut rand::thread_rng());
        }

        info!(
            featured_only = featured_only,
            count = artists.len(),
            "Fetched artists"
        );

        self.cache.set(key, CachePayload::Artists(artists.clone())).await;
        Ok(artists)
    }

    /// One artist by record id; `None` when no record matches
    pub async fn get_artist_by_id(&self, id: &str) -> Option<Artist> {
        self.try_get_artist_by_id(id)
            .await
            .unwrap_or_else(|e| log_failure("get_artist_by_id", &e))
    }

    pub async fn try_get_artist_by_id(&self, id: &str) -> Result<Option<Artist>, BackendError> {
        if id.trim().is_empty() {
            return Ok(None);
        }

        let key = CacheKey::Artist { id: id.to_string() };
        if let Some(CachePayload::Artist(artist)) = self.cache.get(&key).await.as_deref() {
            return Ok(Some(artist.clone()));
        }

        let query = SelectQuery::all()
            .filter(Filter::RecordIds(vec![id.to_string()]))
            .max_records(1);

        let records = self.fetch(Table::Artists, &query).await?;
        let Some(record) = records.first() else {
            debug!(artist_id = %id, "Artist not found");
            return Ok(None);
        };

        match Artist::validate_with(record, &self.options.validation) {
            Ok(artist) => {
                self.cache.set(key, CachePayload::Artist(artist.clone())).await;
                Ok(Some(artist))
            }
            Err(e) => {
                warn!(artist_id = %id, "Rejected artist record: {}", e);
                Ok(None)
            }
        }
    }

    /// Artists for a set of record ids, sorted by name
    pub async fn list_artists_by_ids(&self, ids: &[String]) -> Vec<Artist> {
        self.try_list_artists_by_ids(ids)
            .await
            .unwrap_or_else(|e| log_failure("list_artists_by_ids", &e))
    }

    pub async fn try_list_artists_by_ids(&self, ids: &[String]) -> Result<Vec<Artist>, BackendError> {
        let unique_ids = normalize_ids(ids);
        if unique_ids.is_empty() {
            return Ok(Vec::new());
        }

        let key = CacheKey::ArtistsByIds(unique_ids.clone());

        if let Some(CachePayload::Artists(artists)) = self.cache.get(&key).await.as_deref() {
            return Ok(artists.clone());
        }

        let query = SelectQuery::all()
            .filter(Filter::RecordIds(unique_ids))
            .sort_by("Name", SortDirection::Asc);

        let records = self.fetch(Table::Artists, &query).await?;
        let artists: Vec<Artist> = self.validate_all(&records);

        info!(count = artists.len(), "Fetched artists by id");

        self.cache.set(key, CachePayload::Artists(artists.clone())).await;
        Ok(artists)
    }

    /// Every distinct artist tag, sorted ascending
    pub async fn list_all_tags(&self) -> Vec<String> {
        self.try_list_all_tags()
            .await
            .unwrap_or_else(|e| log_failure("list_all_tags", &e))
    }

    pub async fn try_list_all_tags(&self) -> Result<Vec<String>, BackendError> {
        let key = CacheKey::Tags;
        if let Some(CachePayload::Tags(tags)) = self.cache.get(&key).await.as_deref() {
            return Ok(tags.clone());
        }

        let query = SelectQuery::all().fields(&["Tags"]);
        let records = self.fetch(Table::Artists, &query).await?;
        let tags = extract_tags(&records);

        info!(count = tags.len(), "Fetched tags");

        self.cache.set(key, CachePayload::Tags(tags.clone())).await;
        Ok(tags)
    }

    // ------------------------------------------------------------------
    // Related tables
    // ------------------------------------------------------------------

    /// Reviews that reference `artist_id`
    pub async fn list_artist_reviews(&self, artist_id: &str) -> Vec<Review> {
        self.try_list_artist_reviews(artist_id)
            .await
            .unwrap_or_else(|e| log_failure("list_artist_reviews", &e))
    }

    pub async fn try_list_artist_reviews(&self, artist_id: &str) -> Result<Vec<Review>, BackendError> {
        let key = CacheKey::Reviews {
            artist_id: artist_id.to_string(),
        };
        if let Some(CachePayload::Reviews(reviews)) = self.cache.get(&key).await.as_deref() {
            return Ok(reviews.clone());
        }

        let records = self.fetch(Table::Reviews, &SelectQuery::all()).await?;
        let reviews: Vec<Review> = self
            .validate_all::<Review>(&records)
            .into_iter()
            .filter(|review| review.mentions(artist_id))
            .collect();

        info!(artist_id = %artist_id, count = reviews.len(), "Fetched reviews");

        self.cache.set(key, CachePayload::Reviews(reviews.clone())).await;
        Ok(reviews)
    }

    /// Services offered by `artist_id`
    pub async fn list_artist_services(&self, artist_id: &str) -> Vec<Service> {
        self.try_list_artist_services(artist_id)
            .await
            .unwrap_or_else(|e| log_failure("list_artist_services", &e))
    }

    pub async fn try_list_artist_services(&self, artist_id: &str) -> Result<Vec<Service>, BackendError> {
        let key = CacheKey::Services {
            artist_id: artist_id.to_string(),
        };
        if let Some(CachePayload::Services(services)) = self.cache.get(&key).await.as_deref() {
            return Ok(services.clone());
        }

        let records = self.fetch(Table::Services, &SelectQuery::all()).await?;
        let services: Vec<Service> = self
            .validate_all::<Service>(&records)
            .into_iter()
            .filter(|service| service.offered_by(artist_id))
            .collect();

        info!(artist_id = %artist_id, count = services.len(), "Fetched services");

        self.cache.set(key, CachePayload::Services(services.clone())).await;
        Ok(services)
    }

    /// Quick facts for `artist_id`, by `Order` with unordered facts last
    pub async fn list_artist_quick_facts(&self, artist_id: &str) -> Vec<QuickFact> {
        self.try_list_artist_quick_facts(artist_id)
            .await
            .unwrap_or_else(|e| log_failure("list_artist_quick_facts", &e))
    }

    pub async fn try_list_artist_quick_facts(
        &self,
        artist_id: &str,
    ) -> Result<Vec<QuickFact>, BackendError> {
        let key = CacheKey::QuickFacts {
            artist_id: artist_id.to_string(),
        };
        if let Some(CachePayload::QuickFacts(facts)) = self.cache.get(&key).await.as_deref() {
            return Ok(facts.clone());
        }

        let records = self.fetch(Table::QuickFacts, &SelectQuery::all()).await?;
        let mut facts: Vec<QuickFact> = self
            .validate_all::<QuickFact>(&records)
            .into_iter()
            .filter(|fact| fact.belongs_to(artist_id))
            .collect();
        facts.sort_by_key(|fact| (fact.order.is_none(), fact.order));

        info!(artist_id = %artist_id, count = facts.len(), "Fetched quick facts");

        self.cache.set(key, CachePayload::QuickFacts(facts.clone())).await;
        Ok(facts)
    }
}

fn log_failure<T: Default>(operation: &'static str, err: &BackendError) -> T {
    error!(operation = operation, "Backend request failed: {}", err);
    T::default()
}
