use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;

use super::{
    dto::{CachedConfig, OAuth2Platform},
    source::ConfigSource,
};

pub const CACHE_TTL_MS: i64 = 5 * 60 * 1000;

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Persistence for the last fetched config.
pub trait CacheStore: Send + Sync {
    fn load(&self) -> Option<CachedConfig>;
    fn save(&self, config: &CachedConfig) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryCacheStore {
    slot: Mutex<Option<CachedConfig>>,
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Option<CachedConfig> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn save(&self, config: &CachedConfig) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(config.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// JSON file store. An unreadable or corrupt file counts as an empty cache.
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<CachedConfig> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring corrupt OAuth config cache {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&self, config: &CachedConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec(config)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// TTL cache in front of a [`ConfigSource`]. There is no other invalidation than
/// the TTL and an explicit [`OAuthConfigCache::invalidate`].
#[derive(Clone)]
pub struct OAuthConfigCache {
    source: Arc<dyn ConfigSource>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
    refresh: Arc<AsyncMutex<()>>,
}

impl OAuthConfigCache {
    pub fn new(source: Arc<dyn ConfigSource>, store: Arc<dyn CacheStore>) -> Self {
        Self::with_clock(source, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn ConfigSource>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            ttl_ms: CACHE_TTL_MS,
            refresh: Arc::new(AsyncMutex::new(())),
        }
    }

    fn fresh(&self, cached: &CachedConfig) -> bool {
        self.clock.now_millis() - cached.timestamp < self.ttl_ms
    }

    pub async fn platforms(&self) -> Result<Vec<OAuth2Platform>> {
        if let Some(cached) = self.store.load().filter(|c| self.fresh(c)) {
            return Ok(cached.platforms);
        }

        // Concurrent callers wait for one refresh instead of each hitting the source.
        let _guard = self.refresh.lock().await;
        let stale = self.store.load();
        if let Some(cached) = stale.as_ref().filter(|c| self.fresh(c)) {
            return Ok(cached.platforms.clone());
        }

        match self.source.fetch().await {
            Ok(platforms) => {
                let config = CachedConfig {
                    platforms: platforms.clone(),
                    timestamp: self.clock.now_millis(),
                };
                if let Err(e) = self.store.save(&config) {
                    log::warn!("Failed to persist OAuth config cache: {}", e);
                }
                Ok(platforms)
            }
            Err(e) => match stale {
                Some(cached) => {
                    log::warn!("OAuth config fetch failed, serving stale copy: {}", e);
                    Ok(cached.platforms)
                }
                None => Err(e),
            },
        }
    }

    pub async fn platform(&self, id: &str) -> Result<Option<OAuth2Platform>> {
        Ok(self.platforms().await?.into_iter().find(|p| p.id == id))
    }

    pub async fn is_oauth2_available(&self, id: &str) -> bool {
        match self.platform(id).await {
            Ok(Some(platform)) => platform.oauth2_available,
            Ok(None) => false,
            Err(e) => {
                log::error!("Failed to load OAuth config: {}", e);
                false
            }
        }
    }

    pub async fn oauth2_platforms(&self) -> Result<Vec<OAuth2Platform>> {
        Ok(self
            .platforms()
            .await?
            .into_iter()
            .filter(|p| p.oauth2_available)
            .collect())
    }

    pub fn invalidate(&self) -> Result<()> {
        self.store.clear()
    }
}
