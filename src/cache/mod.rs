//! In-memory API response cache.
//!
//! [`ApiCache`] is a bounded key/value store with per-entry expiry. It sits
//! in front of the recipe sources and the AI generator inside
//! [`RecipeService`](crate::service::RecipeService); a hit bypasses every
//! upstream call.
//!
//! # Expiry
//!
//! Entries are never returned once `now > expiry`. Expired entries are
//! removed lazily when read; there is no sweep task, so long-idle keys keep
//! their memory until the next read of that key or until they are evicted.
//!
//! # Eviction
//!
//! When a *new* key is inserted into a full cache, exactly one entry is
//! evicted: the earliest inserted among those still present. Reads do not
//! refresh an entry's position and overwriting an existing key keeps its
//! original position, so this is insertion-order (FIFO) eviction, not LRU.
//!
//! # Time source
//!
//! Expiry uses [`tokio::time::Instant`], which lets tests pause and advance
//! the clock (`#[tokio::test(start_paused = true)]`).

mod key;

pub use key::generate_key;

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::trace;

/// Default maximum number of entries.
const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default time-to-live (one hour).
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for an [`ApiCache`].
///
/// ```rust
/// # use larder::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 100.
    pub max_entries: usize,
    /// Time-to-live used by [`ApiCache::set`]. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the default time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A cached value and the instant after which it is stale.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub expiry: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expiry
    }
}

/// Bounded TTL cache keyed on strings.
///
/// Entries live in an [`IndexMap`], whose iteration order is insertion order;
/// index 0 is always the eviction candidate. All operations are infallible and take `&self`; the cache can be shared
/// behind an `Arc` across tasks.
pub struct ApiCache<T> {
    entries: Mutex<IndexMap<String, CacheEntry<T>>>,
    ttl: Duration,
    max_size: usize,
}

impl<T: Clone> ApiCache<T> {
    /// Create an empty cache.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(IndexMap::with_capacity(config.max_entries)),
            ttl: config.ttl,
            max_size: config.max_entries,
        }
    }

    /// Look up a value.
    ///
    /// Returns `None` when the key is absent or its entry has expired; an
    /// expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        let (index, _, entry) = entries.get_full(key)?;
        if entry.is_expired(Instant::now()) {
            trace!(key, "cache entry expired");
            entries.shift_remove_index(index);
            return None;
        }
        Some(entry.data.clone())
    }

    /// Insert or overwrite a value using the cache's default TTL.
    pub fn set(&self, key: impl Into<String>, data: T) {
        self.set_with_ttl(key, data, self.ttl);
    }

    /// Insert or overwrite a value with an explicit TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, data: T, ttl: Duration) {
        if self.max_size == 0 {
            return;
        }
        let key = key.into();
        let entry = CacheEntry {
            data,
            expiry: Instant::now() + ttl,
        };

        let mut entries = self.lock();
        if let Some(existing) = entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        if entries.len() >= self.max_size {
            if let Some((oldest, _)) = entries.shift_remove_index(0) {
                trace!(key = %oldest, "evicting oldest cache entry");
            }
        }
        entries.insert(key, entry);
    }

    /// Remove a key. No-op when absent.
    pub fn delete(&self, key: &str) {
        self.lock().shift_remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries currently held, including expired entries not yet read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry exists for `key`, without checking or touching expiry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// The configured maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The default TTL used by [`set`](Self::set).
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, CacheEntry<T>>> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock still guards valid data.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone> Default for ApiCache<T> {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
