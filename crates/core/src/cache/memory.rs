//! In-process cache backend
//!
//! Used for tests and single-instance deployments without Redis.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{glob_match, CacheResult, CacheStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache with per-entry expiry
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Live keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, e)| !e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it so the map does not grow without bound
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        Ok((before - entries.len()) as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache
            .set("task:1", "payload", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("task:1").await.unwrap(),
            Some("payload".to_string())
        );

        cache.delete("task:1").await.unwrap();
        assert!(cache.get("task:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = MemoryCache::new();
        cache.set("task:1", "payload", Duration::ZERO).await.unwrap();

        assert!(cache.get("task:1").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_pattern_only_touches_matching_keys() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("tasks:{}", "[]", ttl).await.unwrap();
        cache
            .set("tasks:{\"status\":\"todo\"}", "[]", ttl)
            .await
            .unwrap();
        cache.set("task:1", "{}", ttl).await.unwrap();

        let deleted = cache.delete_pattern("tasks:*").await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(cache.keys().await, vec!["task:1".to_string()]);
    }
}
