//! News Cache
//!
//! Single-slot, process-lifetime cache for the nine dashboard cards.
//! Fresh entries are served as-is; stale or missing entries trigger a
//! refresh. Refreshes are single-flight: concurrent misses queue behind the
//! first one and then read what it stored instead of fetching again.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use finterm_core::NewsCardItem;

use crate::clock::SharedClock;

/// How long a stored card list is served without refresh (30 minutes)
pub const NEWS_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct CachedNews {
    items: Vec<NewsCardItem>,
    stored_at: DateTime<Utc>,
}

/// Contents of the slot plus whether they are still inside the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub items: Vec<NewsCardItem>,
    pub stored_at: DateTime<Utc>,
    pub is_fresh: bool,
}

/// Result of [`NewsCache::get_or_refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRead {
    pub items: Vec<NewsCardItem>,
    pub stored_at: DateTime<Utc>,
    /// `false` only for the caller that actually ran the refresh
    pub from_cache: bool,
}

/// Cache state for the health endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub populated: bool,
    pub fresh: bool,
    pub stored_at: Option<DateTime<Utc>>,
    pub ttl_secs: u64,
}

pub struct NewsCache {
    slot: RwLock<Option<CachedNews>>,
    /// Held for the duration of a refresh
    refresh_lock: Mutex<()>,
    window: Duration,
    clock: SharedClock,
}

impl NewsCache {
    pub fn new(window: Duration, clock: SharedClock) -> Self {
        Self {
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            window,
            clock,
        }
    }

    /// Current contents, fresh or not
    pub fn get(&self) -> Option<CacheSnapshot> {
        let now = self.clock.now();
        self.slot.read().as_ref().map(|entry| CacheSnapshot {
            items: entry.items.clone(),
            stored_at: entry.stored_at,
            is_fresh: self.is_fresh_at(entry.stored_at, now),
        })
    }

    /// Current contents only if inside the freshness window
    pub fn fresh(&self) -> Option<CacheSnapshot> {
        self.get().filter(|snapshot| snapshot.is_fresh)
    }

    /// Overwrite the slot, stamping the current time
    pub fn set(&self, items: Vec<NewsCardItem>) -> DateTime<Utc> {
        let stored_at = self.clock.now();
        *self.slot.write() = Some(CachedNews { items, stored_at });
        debug!("Stored news cards at {}", stored_at);
        stored_at
    }

    /// Drop the slot so the next read refreshes
    pub fn invalidate(&self) {
        *self.slot.write() = None;
        info!("News cache invalidated");
    }

    /// Serve fresh contents or run `refresh` exactly once across concurrent callers
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> CacheRead
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<NewsCardItem>>,
    {
        if let Some(hit) = self.fresh() {
            return CacheRead::hit(hit);
        }

        let _guard = self.refresh_lock.lock().await;

        // Someone else may have refreshed while we waited for the lock
        if let Some(hit) = self.fresh() {
            debug!("News cache refreshed by a concurrent request");
            return CacheRead::hit(hit);
        }

        let items = refresh().await;
        let stored_at = self.set(items.clone());
        CacheRead {
            items,
            stored_at,
            from_cache: false,
        }
    }

    pub fn status(&self) -> CacheStatus {
        let snapshot = self.get();
        CacheStatus {
            populated: snapshot.is_some(),
            fresh: snapshot.as_ref().map(|s| s.is_fresh).unwrap_or(false),
            stored_at: snapshot.map(|s| s.stored_at),
            ttl_secs: self.window.as_secs(),
        }
    }

    fn is_fresh_at(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // A clock that stepped backwards counts as zero age
        (now - stored_at)
            .to_std()
            .map(|age| age < self.window)
            .unwrap_or(true)
    }
}

impl CacheRead {
    fn hit(snapshot: CacheSnapshot) -> Self {
        Self {
            items: snapshot.items,
            stored_at: snapshot.stored_at,
            from_cache: true,
        }
    }
}
