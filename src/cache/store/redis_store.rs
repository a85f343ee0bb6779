use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};

use super::CacheStore;
use crate::cache::CacheError;

/// Redis-backed store; every command is bounded by `timeout` so an unreachable
/// server cannot stall a request beyond it
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(client: RedisClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.bounded(self.client.get_multiplexed_async_connection())
            .await
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.get(key)).await
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        match ttl {
            // SETEX rejects a zero expiry, round sub-second TTLs up
            Some(ttl) => {
                let secs = ttl.as_secs().max(1);
                self.bounded(conn.set_ex(key, value, secs)).await
            }
            None => self.bounded(conn.set(key, value)).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.del(key)).await
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;

        let pattern = format!("{}*", escape_glob(prefix));
        let keys: Vec<String> = self.bounded(conn.keys(pattern)).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        self.bounded(conn.del(keys)).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.exists(key)).await
    }
}

/// Escapes the characters `KEYS` treats as glob syntax so the prefix matches literally
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
