//! In-process weather response cache.
//!
//! Entries live for a fixed TTL and are evicted lazily: a read that finds a
//! stale entry removes it. There is no capacity bound and no background sweep;
//! the map only grows until the process restarts.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::WeatherPayload;

/// How long a cached payload stays valid.
pub const CACHE_TTL_MINUTES: i64 = 10;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: WeatherPayload,
    fetched_at: DateTime<Utc>,
}

/// Weather payloads keyed by location cache key.
///
/// Cloning is cheap and clones share the same map.
#[derive(Clone)]
pub struct WeatherCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
            clock,
        }
    }

    /// Return the cached payload for `key` if it is younger than the TTL.
    pub async fn get(&self, key: &str) -> Option<WeatherPayload> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            let entry = entries.get(key)?;
            if now - entry.fetched_at < self.ttl {
                return Some(entry.payload.clone());
            }
        }

        // A concurrent put may have refreshed the entry since the read lock was released.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|e| now - e.fetched_at >= self.ttl)
        {
            entries.remove(key);
            tracing::debug!("Evicted stale cache entry for {}", key);
        }
        None
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub async fn put(&self, key: String, payload: WeatherPayload) {
        let entry = CacheEntry {
            payload,
            fetched_at: self.clock.now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    #[cfg(test)]
    pub(crate) async fn fetched_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(key).map(|e| e.fetched_at)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Test clock that only moves when told to.
#[cfg(test)]
pub(crate) struct ManualClock(std::sync::Mutex<DateTime<Utc>>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(start: DateTime<Utc>) -> Self {
        Self(std::sync::Mutex::new(start))
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
