use chrono::{DateTime, Utc};

use crate::{CacheDomain, CacheKey};

pub mod fs;

/// Per-domain cache-bust flags, set once per run from configuration.
///
/// A busted domain reads as absent but still accepts writes, so future
/// runs without the flag benefit from this run's fetches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BustFlags {
    pub listing: bool,
    pub detail: bool,
    pub summary: bool,
}

impl BustFlags {
    pub fn is_busted(&self, domain: CacheDomain) -> bool {
        match domain {
            CacheDomain::Listing => self.listing,
            CacheDomain::Detail => self.detail,
            CacheDomain::Summary => self.summary,
        }
    }
}

/// A cached payload plus the time it was persisted.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: String,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract for the domain-partitioned cache store.
///
/// Writers for a given key compute the same payload deterministically
/// from the same inputs, so concurrent writes are last-write-wins and
/// no locking is required. Implementations must never expose a
/// partially written entry as a successful `get`.
pub trait CacheStore {
    /// Returns the cached entry, or `None` when the entry is missing
    /// or the key's domain is busted for this run.
    fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Persists the payload. A failed write is cache-miss-equivalent
    /// for future reads; callers keep using the in-memory value.
    fn put(&self, key: &CacheKey, payload: &str) -> Result<(), CacheError>;

    fn is_busted(&self, domain: CacheDomain) -> bool;
}

impl<T: CacheStore> CacheStore for &T {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        (**self).get(key)
    }

    fn put(&self, key: &CacheKey, payload: &str) -> Result<(), CacheError> {
        (**self).put(key, payload)
    }

    fn is_busted(&self, domain: CacheDomain) -> bool {
        (**self).is_busted(domain)
    }
}
