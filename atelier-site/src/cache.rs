//! Response cache
//!
//! Time-bounded memoization of validated query results. Entries are fresh for
//! [`CACHE_TTL`] after they were stored; staleness is checked on read and a
//! stale entry stays in place until the next `set` for its key replaces it.

use atelier_common::{Artist, QuickFact, Review, Service};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Freshness window for every cache entry
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Identity of a cached query
///
/// Carries every parameter that changes the result, so two different queries
/// can never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Artists { featured_only: bool },
    Artist { id: String },
    /// Ids as returned by [`normalize_ids`]
    ArtistsByIds(Vec<String>),
    Tags,
    Reviews { artist_id: String },
    Services { artist_id: String },
    QuickFacts { artist_id: String },
}

/// Sort and deduplicate ids so argument order does not split the cache
pub fn normalize_ids(ids: &[String]) -> Vec<String> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Artists { featured_only } => write!(f, "artists:featured={}", featured_only),
            CacheKey::Artist { id } => write!(f, "artist:{}", id),
            CacheKey::ArtistsByIds(ids) => write!(f, "artists:ids={}", ids.join(",")),
            CacheKey::Tags => f.write_str("tags"),
            CacheKey::Reviews { artist_id } => write!(f, "reviews:{}", artist_id),
            CacheKey::Services { artist_id } => write!(f, "services:{}", artist_id),
            CacheKey::QuickFacts { artist_id } => write!(f, "quick_facts:{}", artist_id),
        }
    }
}

/// Cached value
#[derive(Debug, Clone, PartialEq)]
pub enum CachePayload {
    Artists(Vec<Artist>),
    Artist(Artist),
    Tags(Vec<String>),
    Reviews(Vec<Review>),
    Services(Vec<Service>),
    QuickFacts(Vec<QuickFact>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Arc<CachePayload>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < CACHE_TTL
    }
}

/// Shared cache owned by one data access context
///
/// Readers share the lock; a `set` swaps the whole entry, so a reader sees
/// either the previous payload or the new one.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh payload for `key`, if any
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<CachePayload>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if entry.is_fresh(Instant::now()) {
            tracing::debug!(key = %key, "Cache hit");
            Some(Arc::clone(&entry.payload))
        } else {
            tracing::debug!(key = %key, "Cache entry stale");
            None
        }
    }

    /// Store `payload` under `key`, replacing any previous entry
    pub async fn set(&self, key: CacheKey, payload: CachePayload) {
        let entry = CacheEntry {
            payload: Arc::new(payload),
            stored_at: Instant::now(),
        };
        tracing::debug!(key = %key, "Cache store");
        self.entries.write().await.insert(key, entry);
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
