// =============================================================================
// Indicator Cache — explicit TTL cache for computed series
// =============================================================================
//
// Callers that chart the same (symbol, timeframe, indicator) repeatedly can
// hold one of these and pass it around.  The kernels never see it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{IndicatorKind, IndicatorPoint};

/// Identifies one cached series.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: String,
    pub kind: IndicatorKind,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.symbol, self.timeframe, self.kind)
    }
}

struct CacheEntry {
    points: Arc<Vec<IndicatorPoint>>,
    stored_at: Instant,
}

/// Thread-safe map of computed series that expire after `ttl`.
pub struct IndicatorCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl IndicatorCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached series for `key`, unless missing or expired.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<IndicatorPoint>>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(Arc::clone(&entry.points))
    }

    pub fn insert(&self, key: CacheKey, points: Vec<IndicatorPoint>) -> Arc<Vec<IndicatorPoint>> {
        let points = Arc::new(points);
        self.entries.write().insert(
            key,
            CacheEntry {
                points: Arc::clone(&points),
                stored_at: Instant::now(),
            },
        );
        points
    }

    /// Return the cached series or compute, store and return a fresh one.
    ///
    /// `compute` runs without holding the lock.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<Vec<IndicatorPoint>>
    where
        F: FnOnce() -> Vec<IndicatorPoint>,
    {
        if let Some(points) = self.get(&key) {
            return points;
        }
        debug!(key = %key, "indicator cache miss");
        self.insert(key, compute())
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }

    /// Drop every expired entry.
    pub fn prune(&self) {
        let ttl = self.ttl;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "pruned expired indicator series");
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for IndicatorCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(symbol: &str) -> CacheKey {
        CacheKey {
            symbol: symbol.to_string(),
            timeframe: "1h".to_string(),
            kind: IndicatorKind::Rsi { period: 14 },
        }
    }

    fn points(value: f64) -> Vec<IndicatorPoint> {
        vec![IndicatorPoint {
            timestamp: 1,
            value,
            close: 1.0,
            k_line: None,
            state: None,
        }]
    }

    #[test]
    fn hit_within_ttl() {
        let cache = IndicatorCache::new(Duration::from_secs(60));
        cache.insert(key("BTCUSDT"), points(42.0));
        assert_eq!(cache.get(&key("BTCUSDT")).unwrap()[0].value, 42.0);
        assert!(cache.get(&key("ETHUSDT")).is_none());
    }

    #[test]
    fn zero_ttl_always_expires() {
        let cache = IndicatorCache::new(Duration::ZERO);
        cache.insert(key("BTCUSDT"), points(42.0));
        assert!(cache.get(&key("BTCUSDT")).is_none());
        assert_eq!(cache.len(), 1);
        cache.prune();
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_compute_only_computes_on_miss() {
        let cache = IndicatorCache::new(Duration::from_secs(60));
        let mut calls = 0;
        let first = cache.get_or_compute(key("BTCUSDT"), || {
            calls += 1;
            points(1.0)
        });
        let second = cache.get_or_compute(key("BTCUSDT"), || {
            calls += 1;
            points(2.0)
        });
        assert_eq!(calls, 1);
        assert_eq!(first[0].value, 1.0);
        assert_eq!(second[0].value, 1.0);
    }

    #[test]
    fn params_are_part_of_key() {
        let cache = IndicatorCache::default();
        cache.insert(key("BTCUSDT"), points(1.0));
        let other = CacheKey {
            kind: IndicatorKind::Rsi { period: 7 },
            ..key("BTCUSDT")
        };
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = IndicatorCache::default();
        cache.insert(key("BTCUSDT"), points(1.0));
        cache.invalidate(&key("BTCUSDT"));
        assert!(cache.get(&key("BTCUSDT")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn key_display() {
        assert_eq!(key("BTCUSDT").to_string(), "BTCUSDT@1h:RSI(14)");
    }
}
