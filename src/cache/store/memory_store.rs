use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{CacheEntry, CacheStore};
use crate::cache::CacheError;

/// In-process store with lazy expiry: stale entries are dropped when read
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (CacheEntry, Option<Instant>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((_, Some(deadline))) if Instant::now() >= *deadline => {
                entries.remove(key);
                None
            }
            Some((entry, _)) => Some(entry.value.clone()),
            None => None,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.live_value(key))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        let entry = CacheEntry {
            key: key.to_string(),
            value,
            expires_at: ttl.map(|ttl| {
                chrono::Utc::now().timestamp_millis() + ttl.as_millis() as i64
            }),
        };

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), (entry, deadline));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_value(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_no_ttl_never_expires() {
        let store = MemoryStore::new();
        store.set("k", "v".into(), None).await.unwrap();

        tokio::time::advance(Duration::from_secs(86400 * 30)).await;

        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_read() {
        let store = MemoryStore::new();
        store
            .set("k", "v".into(), Some(Duration::from_secs(1)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_replaces_existing_value() {
        let store = MemoryStore::new();
        store.set("k", "old".into(), None).await.unwrap();
        store.set("k", "new".into(), None).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_delete_by_prefix_counts_removed() {
        let store = MemoryStore::new();
        store.set("refresh_token:a", "1".into(), None).await.unwrap();
        store.set("refresh_token:b", "2".into(), None).await.unwrap();
        store.set("intranet:x", "3".into(), None).await.unwrap();

        let removed = store.delete_by_prefix("refresh_token:").await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.exists("intranet:x").await.unwrap());
    }
}
