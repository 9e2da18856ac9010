//! Cache layer
//!
//! A key-value store with per-key expiry and glob-pattern deletion, used as a
//! read-through accelerator in front of the stores. Backends implement
//! [`CacheStore`]; services talk to the best-effort [`Cache`] facade, which
//! never lets a backend failure escape.

mod memory;
mod redis_cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use memory::MemoryCache;
pub use redis_cache::{redact_url, RedisCache};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Raw string cache backend
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live value by key
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value that expires after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete a single key
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Delete every key matching a glob pattern, returning the count removed
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Backend name for health reporting
    fn name(&self) -> &'static str;
}

/// Backend used when no cache is configured or reachable. Always misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_pattern(&self, _pattern: &str) -> CacheResult<u64> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Best-effort typed cache.
///
/// Values are stored as JSON. Backend errors are logged and turned into a
/// miss (reads) or a no-op (writes); an undecodable payload is also a miss.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledCache))
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "Cache MISS");
                return None;
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key, "Cache HIT");
                Some(value)
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache value could not be serialized");
                return;
            }
        };
        match self.store.set(key, &raw, ttl).await {
            Ok(()) => tracing::debug!(key, ttl_seconds = ttl.as_secs(), "Cache SET"),
            Err(err) => tracing::warn!(key, error = %err, "Cache write failed"),
        }
    }

    pub async fn invalidate(&self, key: &str) {
        match self.store.delete(key).await {
            Ok(()) => tracing::debug!(key, "Cache DEL"),
            Err(err) => tracing::warn!(key, error = %err, "Cache delete failed"),
        }
    }

    pub async fn invalidate_pattern(&self, pattern: &str) {
        match self.store.delete_pattern(pattern).await {
            Ok(deleted) => tracing::debug!(pattern, deleted, "Cache pattern DEL"),
            Err(err) => tracing::warn!(pattern, error = %err, "Cache pattern delete failed"),
        }
    }
}

/// Match `key` against a glob with `*` (any run) and `?` (any one char)
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == key[k]) {
            p += 1;
            k += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, k));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            k = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
