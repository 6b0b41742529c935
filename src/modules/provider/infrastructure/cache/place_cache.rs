use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::log_debug;
use crate::modules::provider::domain::{PlaceHit, PlaceSearchProvider};
use crate::shared::errors::ProviderError;
use async_trait::async_trait;

#[derive(Debug, Clone)]
struct CacheEntry {
    hit: Option<PlaceHit>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(hit: Option<PlaceHit>, ttl: Duration) -> Self {
        Self {
            hit,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-process cache for place lookups, keyed by normalized query.
///
/// Several passes over the same record look up the same venue name; every
/// lookup is billed, so repeats within a run come from here. Misses are
/// cached too, on a shorter TTL, so a venue the index does not know is not
/// re-queried for every pass.
#[derive(Debug)]
pub struct PlaceCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    found_ttl: Duration,
    not_found_ttl: Duration,
}

impl PlaceCache {
    pub fn new(found_ttl: Duration, not_found_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            found_ttl,
            not_found_ttl,
        }
    }

    fn cache_key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Some(cached lookup result) on a fresh entry, None when the caller
    /// has to ask the provider.
    pub fn get(&self, query: &str) -> Option<Option<PlaceHit>> {
        let key = Self::cache_key(query);

        if let Some(entry) = self.entries.get(&key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.hit.clone());
            }
        }
        // Drop the read guard before removing the stale entry.
        self.entries.remove_if(&key, |_, entry| entry.is_expired());

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, query: &str, hit: Option<PlaceHit>) {
        let ttl = if hit.is_some() {
            self.found_ttl
        } else {
            self.not_found_ttl
        };
        self.entries
            .insert(Self::cache_key(query), CacheEntry::new(hit, ttl));
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for PlaceCache {
    fn default() -> Self {
        // Found entries outlive any single run; misses get retried sooner.
        Self::new(Duration::from_secs(3600), Duration::from_secs(600))
    }
}

/// Caching decorator over any [`PlaceSearchProvider`].
///
/// Callers hold this where they would hold the raw provider; cache reads
/// and fills happen underneath them.
pub struct CachedPlaceSearch {
    inner: Arc<dyn PlaceSearchProvider>,
    cache: PlaceCache,
}

impl CachedPlaceSearch {
    pub fn new(inner: Arc<dyn PlaceSearchProvider>) -> Self {
        Self {
            inner,
            cache: PlaceCache::default(),
        }
    }

    pub fn with_cache(inner: Arc<dyn PlaceSearchProvider>, cache: PlaceCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &PlaceCache {
        &self.cache
    }
}

#[async_trait]
impl PlaceSearchProvider for CachedPlaceSearch {
    async fn search_place(&self, query: &str) -> Result<Option<PlaceHit>, ProviderError> {
        if let Some(cached) = self.cache.get(query) {
            log_debug!("places cache hit for '{}'", query);
            return Ok(cached);
        }

        let result = self.inner.search_place(query).await?;
        self.cache.insert(query, result.clone());
        Ok(result)
    }
}
