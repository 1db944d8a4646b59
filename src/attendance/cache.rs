//! Lookup cache adapters.
//!
//! [`MokaEngineCache`] keeps roster and location lookups for a short TTL so
//! repeated status polls and check-in attempts within a request burst do
//! not hit the roster source each time. [`NoopCache`] disables caching.

use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use crate::config::EngineConfig;

use super::ports::{CacheKey, CachedValue, EngineCache};

/// Moka-backed [`EngineCache`] with a time-to-live.
#[derive(Clone)]
pub struct MokaEngineCache {
    inner: Cache<CacheKey, CachedValue>,
}

impl MokaEngineCache {
    /// Creates a cache holding at most `max_capacity` entries for `ttl`.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Creates a cache sized from configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Duration::from_secs(config.cache_ttl_seconds),
            config.cache_max_capacity,
        )
    }
}

impl EngineCache for MokaEngineCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.inner.get(key)
    }

    fn put(&self, key: CacheKey, value: CachedValue) {
        self.inner.insert(key, value);
    }

    fn invalidate(&self, key: &CacheKey) {
        self.inner.invalidate(key);
    }

    fn invalidate_employee(&self, employee_id: &str) {
        let keys: Vec<CacheKey> = self
            .inner
            .iter()
            .filter(|(key, _)| key.employee_id == employee_id)
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();
        debug!(employee_id, entries = keys.len(), "Invalidating cached lookups");
        for key in &keys {
            self.inner.invalidate(key);
        }
    }
}

/// An [`EngineCache`] that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl EngineCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedValue> {
        None
    }

    fn put(&self, _key: CacheKey, _value: CachedValue) {}

    fn invalidate(&self, _key: &CacheKey) {}

    fn invalidate_employee(&self, _employee_id: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::ports::CachePurpose;
    use chrono::NaiveDate;

    fn key(employee_id: &str, purpose: CachePurpose) -> CacheKey {
        CacheKey::new(
            employee_id,
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            purpose,
        )
    }

    #[test]
    fn test_put_then_get() {
        let cache = MokaEngineCache::new(Duration::from_secs(60), 100);
        cache.put(key("emp_001", CachePurpose::Roster), CachedValue::Roster(vec![]));

        assert_eq!(
            cache.get(&key("emp_001", CachePurpose::Roster)),
            Some(CachedValue::Roster(vec![]))
        );
        assert_eq!(cache.get(&key("emp_001", CachePurpose::WorkLocation)), None);
    }

    #[test]
    fn test_invalidate_single_key() {
        let cache = MokaEngineCache::new(Duration::from_secs(60), 100);
        cache.put(key("emp_001", CachePurpose::Roster), CachedValue::Roster(vec![]));
        cache.invalidate(&key("emp_001", CachePurpose::Roster));

        assert_eq!(cache.get(&key("emp_001", CachePurpose::Roster)), None);
    }

    #[test]
    fn test_invalidate_employee_keeps_other_employees() {
        let cache = MokaEngineCache::new(Duration::from_secs(60), 100);
        cache.put(key("emp_001", CachePurpose::Roster), CachedValue::Roster(vec![]));
        cache.put(
            key("emp_001", CachePurpose::WorkLocation),
            CachedValue::WorkLocation(None),
        );
        cache.put(key("emp_002", CachePurpose::Roster), CachedValue::Roster(vec![]));

        cache.invalidate_employee("emp_001");

        assert_eq!(cache.get(&key("emp_001", CachePurpose::Roster)), None);
        assert_eq!(cache.get(&key("emp_001", CachePurpose::WorkLocation)), None);
        assert!(cache.get(&key("emp_002", CachePurpose::Roster)).is_some());
    }

    #[test]
    fn test_noop_cache_never_returns() {
        let cache = NoopCache;
        cache.put(key("emp_001", CachePurpose::Roster), CachedValue::Roster(vec![]));
        assert_eq!(cache.get(&key("emp_001", CachePurpose::Roster)), None);
    }
}
