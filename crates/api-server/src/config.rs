//! Environment configuration

use std::path::PathBuf;

use anyhow::{bail, Context};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STORE_URI: &str = "file://.taskboard-data";
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_JWT_SECRET: &str = "default_jwt_secret";

/// Where users and tasks are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// JSON files under a data directory
    Directory(PathBuf),
    /// Process memory only
    Memory,
}

impl StoreLocation {
    pub fn parse(uri: &str) -> anyhow::Result<Self> {
        if let Some(dir) = uri.strip_prefix("file://") {
            if dir.is_empty() {
                bail!("STORE_URI is missing a directory: {}", uri);
            }
            return Ok(Self::Directory(PathBuf::from(dir)));
        }
        if uri == "memory://" {
            return Ok(Self::Memory);
        }
        bail!("Unsupported STORE_URI scheme: {}", uri)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreLocation,
    /// `None` runs without a cache
    pub redis_url: Option<String>,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", value))?,
            None => DEFAULT_PORT,
        };

        let store_uri = lookup("STORE_URI").unwrap_or_else(|| {
            tracing::warn!("STORE_URI not set, using {}", DEFAULT_STORE_URI);
            DEFAULT_STORE_URI.to_string()
        });
        let store = StoreLocation::parse(store_uri.trim())?;

        let redis_url = match lookup("REDIS_URL") {
            Some(value) if value.trim().is_empty() || value.trim() == "none" => None,
            Some(value) => Some(value.trim().to_string()),
            None => {
                tracing::warn!("REDIS_URL not set, using {}", DEFAULT_REDIS_URL);
                Some(DEFAULT_REDIS_URL.to_string())
            }
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set, using the development default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            port,
            store,
            redis_url,
            jwt_secret,
        })
    }
}
