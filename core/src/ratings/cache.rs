use hashbrown::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{CardRating, RatingsProvider};
use crate::draft::CardId;
use crate::error::RatingsError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

struct Entry {
    rating: CardRating,
    inserted: Instant,
}

/// Bounded TTL cache of card ratings keyed by (card, color filter).
pub struct RatingsCache {
    entries: Mutex<HashMap<(CardId, String), Entry>>,
    ttl: Duration,
    max_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl RatingsCache {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_size: max_size.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(CardId, String), Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, card_id: CardId, color_filter: &str) -> Option<CardRating> {
        let mut entries = self.lock();
        let key = (card_id, color_filter.to_string());

        let fresh = entries
            .get(&key)
            .map(|e| e.inserted.elapsed() < self.ttl);

        match fresh {
            Some(true) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entries.get(&key).map(|e| e.rating.clone())
            }
            Some(false) => {
                entries.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, card_id: CardId, color_filter: &str, rating: CardRating) {
        let mut entries = self.lock();
        let key = (card_id, color_filter.to_string());

        if !entries.contains_key(&key) && entries.len() >= self.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        entries.insert(
            key,
            Entry {
                rating,
                inserted: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.lock().len(),
        }
    }
}

/// Puts a [`RatingsCache`] in front of another provider.
pub struct CachedRatings<P> {
    inner: P,
    cache: RatingsCache,
}

impl<P: RatingsProvider> CachedRatings<P> {
    pub fn new(inner: P, cache: RatingsCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &RatingsCache {
        &self.cache
    }
}

impl<P: RatingsProvider> RatingsProvider for CachedRatings<P> {
    fn card_rating(&self, card_id: CardId, color_filter: &str) -> Result<CardRating, RatingsError> {
        if let Some(hit) = self.cache.get(card_id, color_filter) {
            return Ok(hit);
        }
        let rating = self.inner.card_rating(card_id, color_filter)?;
        self.cache.insert(card_id, color_filter, rating.clone());
        Ok(rating)
    }
}
