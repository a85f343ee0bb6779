// Cache module
// A TTL key/value cache in front of the external adapters and the token service.
// The cache is an optimization only: backend failures are logged and swallowed here.

pub mod keys;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use store::{CacheEntry, CacheStore, MemoryStore, RedisStore};

/// Failure of the backing store; never escapes [`Cache`]
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("cache backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fire-and-forget cache facade shared by every adapter
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// In-process cache, used when no Redis URL is configured and in tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns the cached value, or `None` on a miss, an expired entry, a backend
    /// failure, or a value that no longer deserializes into `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Cache get error for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Cache entry {} could not be decoded: {}", key, e);
                None
            }
        }
    }

    /// Stores `value` as JSON; `ttl = None` keeps the entry until deleted
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Cache set error for {}: {}", key, CacheError::from(e));
                return;
            }
        };

        if let Err(e) = self.store.set(key, json, ttl).await {
            tracing::warn!("Cache set error for {}: {}", key, e);
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!("Cache delete error for {}: {}", key, e);
        }
    }

    /// Removes every key starting with `prefix`
    pub async fn delete_by_prefix(&self, prefix: &str) {
        match self.store.delete_by_prefix(prefix).await {
            Ok(removed) => tracing::debug!("Cache removed {} keys under {}", removed, prefix),
            Err(e) => tracing::warn!("Cache delete pattern error for {}: {}", prefix, e),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.store.exists(key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Cache exists error for {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;

    /// Store whose backend is permanently unreachable
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(10)))
        }

        async fn set(
            &self,
            _key: &str,
            _value: String,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(10)))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(10)))
        }

        async fn delete_by_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(10)))
        }

        async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(10)))
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Profile {
        name: String,
        year: u8,
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrips_json() {
        let cache = Cache::in_memory();
        let profile = Profile {
            name: "John".into(),
            year: 3,
        };

        cache.set("intranet:student:1:profile", &profile, None).await;

        let cached: Option<Profile> = cache.get("intranet:student:1:profile").await;
        assert_eq!(cached, Some(profile));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = Cache::in_memory();
        cache
            .set("short", &"value", Some(Duration::from_secs(1)))
            .await;
        assert!(cache.exists("short").await);

        tokio::time::advance(Duration::from_millis(1100)).await;

        let cached: Option<String> = cache.get("short").await;
        assert!(cached.is_none());
        assert!(!cache.exists("short").await);
    }

    #[tokio::test]
    async fn test_broken_backend_never_raises() {
        let cache = Cache::new(Arc::new(BrokenStore));

        cache.set("k", &1, Some(Duration::from_secs(5))).await;
        cache.delete("k").await;
        cache.delete_by_prefix("k").await;

        let cached: Option<i32> = cache.get("k").await;
        assert!(cached.is_none());
        assert!(!cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = Cache::in_memory();
        cache.set("k", &"not a profile", None).await;

        let cached: Option<Profile> = cache.get("k").await;
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_prefix_only_touches_prefix() {
        let cache = Cache::in_memory();
        cache.set("lms:course:c1:content", &1, None).await;
        cache.set("lms:course:c1:assignments", &2, None).await;
        cache.set("lms:course:c2:content", &3, None).await;

        cache.delete_by_prefix("lms:course:c1:").await;

        assert!(!cache.exists("lms:course:c1:content").await);
        assert!(!cache.exists("lms:course:c1:assignments").await);
        assert!(cache.exists("lms:course:c2:content").await);
    }
}
