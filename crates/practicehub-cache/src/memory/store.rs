//! In-memory cache implementation using the moka crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use tracing::debug;

use practicehub_core::config::cache::CacheConfig;
use practicehub_core::result::AppResult;
use practicehub_core::traits::cache::{CacheProvider, CacheStats};
use practicehub_core::traits::sweeper::Sweeper;

/// A stored value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CachedValue {
    data: String,
    ttl: Duration,
}

/// Expiry policy reading the TTL off each entry.
///
/// A zero TTL means the entry never expires.
struct PerEntryTtl;

impl PerEntryTtl {
    fn ttl_of(value: &CachedValue) -> Option<Duration> {
        if value.ttl.is_zero() {
            None
        } else {
            Some(value.ttl)
        }
    }
}

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Self::ttl_of(value)
    }

    // Overwriting a key restarts its clock with the new TTL.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Self::ttl_of(value)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CachedValue>,
    /// TTL used by `set_default`.
    default_ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    /// Entries evicted on expiry since the last sweep.
    expired: Arc<AtomicU64>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let expired = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&expired);
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                if cause == RemovalCause::Expired {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
            .build();

        Self {
            cache,
            default_ttl: config.default_ttl(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            expired,
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match self.cache.get(key).await {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(value.data))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                CachedValue {
                    data: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<u64> {
        // An expired entry still waiting for eviction does not count as removed.
        if !self.cache.contains_key(key) {
            self.cache.invalidate(key).await;
            return Ok(0);
        }
        Ok(self.cache.remove(key).await.map_or(0, |_| 1))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn stats(&self) -> AppResult<CacheStats> {
        self.cache.run_pending_tasks().await;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys: self.cache.entry_count(),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[async_trait]
impl Sweeper for MemoryCacheProvider {
    fn name(&self) -> &'static str {
        "cache"
    }

    /// Active expiry: evict entries whose TTL elapsed but were never read
    /// again. Returns the number of expired entries evicted since the
    /// previous sweep.
    async fn sweep(&self) -> AppResult<usize> {
        self.cache.run_pending_tasks().await;
        let evicted =
            usize::try_from(self.expired.swap(0, Ordering::Relaxed)).unwrap_or(usize::MAX);
        if evicted > 0 {
            debug!(evicted, "Cache expiry scan evicted entries");
        }
        Ok(evicted)
    }
}
