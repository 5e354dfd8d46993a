//! Term Cache
//!
//! Keyed cache for glossary explanations with a 24 hour freshness window.
//! Lookups of the same term are single-flight; different terms proceed
//! independently.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::SharedClock;

/// How long a term explanation stays valid (24 hours)
pub const TERM_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct TermEntry {
    explanation: String,
    stored_at: DateTime<Utc>,
}

pub struct TermCache {
    entries: DashMap<String, TermEntry>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
    window: Duration,
    clock: SharedClock,
}

impl TermCache {
    pub fn new(window: Duration, clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            window,
            clock,
        }
    }

    /// Fresh explanation for `term`, if any
    pub fn get(&self, term: &str) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .get(term)
            .filter(|entry| self.is_fresh_at(entry.stored_at, now))
            .map(|entry| entry.explanation.clone())
    }

    pub fn insert(&self, term: &str, explanation: String) {
        let stored_at = self.clock.now();
        self.entries.insert(
            term.to_string(),
            TermEntry {
                explanation,
                stored_at,
            },
        );
    }

    /// Fresh hit, or run `lookup` once per term across concurrent callers.
    /// Failures are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, term: &str, lookup: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(hit) = self.get(term) {
            return Ok(hit);
        }

        let lock = self
            .inflight
            .entry(term.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        if let Some(hit) = self.get(term) {
            debug!("Term '{}' resolved by a concurrent lookup", term);
            return Ok(hit);
        }

        let explanation = lookup().await?;
        self.insert(term, explanation.clone());
        Ok(explanation)
    }

    /// Drop stale entries and idle lookup locks
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| self.is_fresh_at(entry.stored_at, now));
        self.inflight.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh_at(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (now - stored_at)
            .to_std()
            .map(|age| age < self.window)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_entry_expires_after_window() {
        let clock = ManualClock::new(Utc::now());
        let cache = TermCache::new(TERM_CACHE_TTL, clock.clone());
        cache.insert("EPS", "每股盈餘".to_string());

        clock.advance(ChronoDuration::hours(23));
        assert_eq!(cache.get("EPS").as_deref(), Some("每股盈餘"));

        clock.advance(ChronoDuration::hours(1));
        assert!(cache.get("EPS").is_none());
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_cached() {
        let cache = TermCache::new(TERM_CACHE_TTL, ManualClock::new(Utc::now()));

        let failed: Result<String, String> = cache
            .get_or_try_insert_with("PMI", || async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(cache.get("PMI").is_none());

        let ok: Result<String, String> = cache
            .get_or_try_insert_with("PMI", || async { Ok("採購經理人指數".to_string()) })
            .await;
        assert_eq!(ok.unwrap(), "採購經理人指數");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_term_looked_up_once() {
        let cache = Arc::new(TermCache::new(TERM_CACHE_TTL, ManualClock::new(Utc::now())));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_try_insert_with("ETF", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            Ok::<_, String>("交易所買賣基金".to_string())
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "交易所買賣基金");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
