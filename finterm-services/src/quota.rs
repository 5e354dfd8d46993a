//! Daily LLM request quota
//!
//! Caps how many enrichment and glossary calls the process makes per UTC
//! day. The counter resets the first time it is touched on a new date.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::SharedClock;

/// Default ceiling on LLM calls per day
pub const MAX_DAILY_REQUESTS: u64 = 50;

#[derive(Debug)]
struct QuotaWindow {
    day: NaiveDate,
    used: u64,
}

#[derive(Debug)]
pub struct DailyQuota {
    window: Mutex<QuotaWindow>,
    limit: u64,
    clock: SharedClock,
    /// Lifetime counters for the health endpoint
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

impl DailyQuota {
    pub fn new(limit: u64, clock: SharedClock) -> Self {
        let day = clock.now().date_naive();
        Self {
            window: Mutex::new(QuotaWindow { day, used: 0 }),
            limit,
            clock,
            total_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    /// Take one slot for today. Returns `false` once the day's quota is spent.
    pub fn try_acquire(&self) -> bool {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let today = self.clock.now().date_naive();

        let mut window = self.window.lock();
        if window.day != today {
            debug!("Quota window rolled over from {} to {}", window.day, today);
            window.day = today;
            window.used = 0;
        }

        if window.used >= self.limit {
            self.rejected_requests.fetch_add(1, Ordering::Relaxed);
            warn!("Daily LLM quota of {} exhausted for {}", self.limit, today);
            return false;
        }

        window.used += 1;
        true
    }

    pub fn stats(&self) -> QuotaStats {
        let today = self.clock.now().date_naive();
        let window = self.window.lock();
        let used_today = if window.day == today { window.used } else { 0 };

        QuotaStats {
            day: today,
            used_today,
            limit: self.limit,
            remaining: self.limit.saturating_sub(used_today),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStats {
    pub day: NaiveDate,
    pub used_today: u64,
    pub limit: u64,
    pub remaining: u64,
    pub total_requests: u64,
    pub rejected_requests: u64,
}
