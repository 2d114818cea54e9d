//! Cache provider trait for memoizing expensive external calls.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Hit/miss counters and current size of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of lookups that found a live entry.
    pub hits: u64,
    /// Number of lookups that found nothing or an expired entry.
    pub misses: u64,
    /// Number of live entries.
    pub keys: u64,
}

/// Trait for cache backends.
///
/// All values are stored as strings (JSON for typed values) in a single
/// global namespace. Every entry carries its own TTL; the provider is
/// responsible for never returning an entry past its expiry.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with an explicit TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value with the provider's default TTL.
    async fn set_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key. Returns the number of entries removed (0 or 1).
    async fn delete(&self, key: &str) -> AppResult<u64>;

    /// Check whether a live entry exists for the key.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json, ttl).await
    }

    /// Read-through lookup: return the cached value, or run `loader`,
    /// store its output under `key` with `ttl` and return it.
    ///
    /// A loader error is returned as-is and nothing is cached.
    async fn get_or_insert_json<T, F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> AppResult<T>
    where
        Self: Sized,
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        if let Some(cached) = self.get_json::<T>(key).await? {
            return Ok(cached);
        }
        let value = loader().await?;
        self.set_json(key, &value, ttl).await?;
        Ok(value)
    }

    /// Hit/miss counters and live entry count.
    async fn stats(&self) -> AppResult<CacheStats>;

    /// Check that the cache backend is usable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Flush all entries from the cache.
    async fn flush_all(&self) -> AppResult<()>;
}
