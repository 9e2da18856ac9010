//! Application state

use std::sync::Arc;

use taskboard_core::cache::{Cache, RedisCache};
use taskboard_core::task::{FileTaskStore, TaskRepository, TaskService};
use taskboard_core::user::{FileUserStore, UserRepository, UserService};

use crate::auth::TokenService;
use crate::config::{Config, StoreLocation};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: UserService,
    tasks: TaskService,
    tokens: TokenService,
    cache_backend: &'static str,
}

impl AppState {
    /// Open the stores and the cache described by `config`
    pub async fn from_config(config: &Config) -> taskboard_core::Result<Self> {
        let (users, tasks): (Arc<dyn UserRepository>, Arc<dyn TaskRepository>) =
            match &config.store {
                StoreLocation::Directory(dir) => {
                    tracing::info!("Using data directory: {:?}", dir);
                    (
                        Arc::new(FileUserStore::new(dir.join("users.json")).await?),
                        Arc::new(FileTaskStore::new(dir.join("tasks.json")).await?),
                    )
                }
                StoreLocation::Memory => {
                    tracing::warn!("Using in-memory stores, data will not survive a restart");
                    (
                        Arc::new(FileUserStore::in_memory()),
                        Arc::new(FileTaskStore::in_memory()),
                    )
                }
            };

        let cache = match &config.redis_url {
            Some(url) => match RedisCache::connect(url).await {
                Ok(redis) => Cache::new(Arc::new(redis)),
                Err(e) => {
                    tracing::warn!("Redis unavailable, running without cache: {}", e);
                    Cache::disabled()
                }
            },
            None => {
                tracing::info!("Cache disabled");
                Cache::disabled()
            }
        };

        Ok(Self::with_parts(
            users,
            tasks,
            cache,
            TokenService::new(&config.jwt_secret),
        ))
    }

    /// In-memory stores and cache, for tests
    #[cfg(test)]
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::with_parts(
            Arc::new(FileUserStore::in_memory()),
            Arc::new(FileTaskStore::in_memory()),
            Cache::new(Arc::new(taskboard_core::cache::MemoryCache::new())),
            TokenService::new(jwt_secret),
        )
    }

    pub fn with_parts(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        cache: Cache,
        tokens: TokenService,
    ) -> Self {
        let cache_backend = cache.backend_name();
        Self {
            inner: Arc::new(AppStateInner {
                users: UserService::new(users.clone()),
                tasks: TaskService::new(tasks, users, cache),
                tokens,
                cache_backend,
            }),
        }
    }

    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    pub fn tasks(&self) -> &TaskService {
        &self.inner.tasks
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn cache_backend(&self) -> &'static str {
        self.inner.cache_backend
    }
}
