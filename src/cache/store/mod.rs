// Cache backing stores
// A Redis-backed store for deployments and an in-process store for demos and tests

mod memory_store;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CacheError;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

/// A single cached value; `expires_at` is a Unix timestamp in milliseconds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub expires_at: Option<i64>,
}

/// Raw string key/value operations of a backing store
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Returns how many keys were removed
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}
