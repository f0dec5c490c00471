use crate::config::CacheConfig;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Logical partition of the store. Each namespace has its own TTL policy
/// and capacity budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    RouteData,
    Retrieval,
    Summary,
}

impl Namespace {
    pub const ALL: [Self; 3] = [Self::RouteData, Self::Retrieval, Self::Summary];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RouteData => "route-data",
            Self::Retrieval => "retrieval",
            Self::Summary => "summary",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::RouteData => 0,
            Self::Retrieval => 1,
            Self::Summary => 2,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

#[derive(Default)]
struct Shard {
    entries: HashMap<String, Entry>,
    hits: u64,
    misses: u64,
}

impl Shard {
    fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Drop oldest-expiring entries until the shard fits its capacity.
    fn evict_to_capacity(&mut self, capacity: usize) {
        while self.entries.len() > capacity.max(1) {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone())
            else {
                return;
            };
            self.entries.remove(&oldest);
        }
    }

    fn stats(&self) -> NamespaceStats {
        let total = self.hits + self.misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
        NamespaceStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate,
        }
    }
}

/// Hit/miss counters for one namespace.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct NamespaceStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Per-namespace statistics snapshot.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CacheStats {
    pub route_data: NamespaceStats,
    pub retrieval: NamespaceStats,
    pub summary: NamespaceStats,
}

impl CacheStats {
    #[must_use]
    pub const fn namespace(&self, namespace: Namespace) -> NamespaceStats {
        match namespace {
            Namespace::RouteData => self.route_data,
            Namespace::Retrieval => self.retrieval,
            Namespace::Summary => self.summary,
        }
    }
}

/// Namespaced, time-bounded key/value store. Concurrent `get`/`set` from
/// many workers never interleave at the single-entry granularity; no cache
/// operation spans multiple keys atomically, so no cross-entry transactions
/// exist.
pub struct CacheStore {
    config: CacheConfig,
    shards: [Mutex<Shard>; 3],
}

impl CacheStore {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            shards: [
                Mutex::new(Shard::default()),
                Mutex::new(Shard::default()),
                Mutex::new(Shard::default()),
            ],
        }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// The configured TTL for a namespace; callers pass it back through
    /// [`CacheStore::set`] unless they need a one-off override.
    #[must_use]
    pub const fn ttl(&self, namespace: Namespace) -> Duration {
        let ms = match namespace {
            Namespace::RouteData => self.config.route_data_ttl_ms,
            Namespace::Retrieval => self.config.retrieval_ttl_ms,
            Namespace::Summary => self.config.summary_ttl_ms,
        };
        Duration::from_millis(ms)
    }

    /// Look up a live entry. An entry is never visible at or after its
    /// expiry instant: lookup behaves as a miss and the entry is purged.
    pub fn get(&self, namespace: Namespace, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut shard = self.shard(namespace);
        let expired = match shard.entries.get(key) {
            Some(entry) if entry.expires_at <= now => true,
            Some(entry) => {
                let value = entry.value.clone();
                shard.hits += 1;
                log::debug!("cache hit {}:{key}", namespace.as_str());
                return Some(value);
            }
            None => false,
        };
        if expired {
            shard.entries.remove(key);
        }
        shard.misses += 1;
        log::debug!("cache miss {}:{key}", namespace.as_str());
        None
    }

    /// Store a value under `key` for `ttl`. Expired entries are purged
    /// opportunistically and the namespace is trimmed to its capacity,
    /// dropping oldest-expiring entries first.
    pub fn set(&self, namespace: Namespace, key: impl Into<String>, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut shard = self.shard(namespace);
        shard.purge_expired(now);
        shard.entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        shard.evict_to_capacity(self.config.capacity);
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            route_data: self.shard(Namespace::RouteData).stats(),
            retrieval: self.shard(Namespace::Retrieval).stats(),
            summary: self.shard(Namespace::Summary).stats(),
        }
    }

    /// Number of live-or-expired entries currently held in a namespace.
    #[must_use]
    pub fn len(&self, namespace: Namespace) -> usize {
        self.shard(namespace).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self, namespace: Namespace) -> bool {
        self.len(namespace) == 0
    }

    /// Drop every entry and counter in every namespace. Intended for test
    /// isolation between scenarios sharing one store.
    pub fn reset(&self) {
        for namespace in Namespace::ALL {
            let mut shard = self.shard(namespace);
            *shard = Shard::default();
        }
    }

    fn shard(&self, namespace: Namespace) -> std::sync::MutexGuard<'_, Shard> {
        self.shards[namespace.index()]
            .lock()
            .expect("cache mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn store_with(capacity: usize) -> CacheStore {
        CacheStore::new(CacheConfig {
            capacity,
            ..CacheConfig::default()
        })
    }

    #[test]
    fn get_returns_what_set_stored() {
        let store = CacheStore::with_defaults();
        store.set(
            Namespace::Retrieval,
            "k",
            json!({"paths": ["a"]}),
            Duration::from_secs(60),
        );
        assert_eq!(
            store.get(Namespace::Retrieval, "k"),
            Some(json!({"paths": ["a"]}))
        );
    }

    #[test]
    fn namespaces_are_isolated() {
        let store = CacheStore::with_defaults();
        store.set(Namespace::RouteData, "k", json!(1), Duration::from_secs(60));
        assert!(store.get(Namespace::Retrieval, "k").is_none());
        assert!(store.get(Namespace::Summary, "k").is_none());
        assert_eq!(store.get(Namespace::RouteData, "k"), Some(json!(1)));
    }

    #[test]
    fn entry_expires_at_its_ttl_and_is_purged() {
        let store = CacheStore::with_defaults();
        store.set(
            Namespace::RouteData,
            "k",
            json!("v"),
            Duration::from_millis(30),
        );
        assert_eq!(store.get(Namespace::RouteData, "k"), Some(json!("v")));

        std::thread::sleep(Duration::from_millis(40));
        assert!(store.get(Namespace::RouteData, "k").is_none());
        // Expired entry was purged on access, not merely hidden.
        assert_eq!(store.len(Namespace::RouteData), 0);
    }

    #[test]
    fn capacity_pressure_drops_oldest_expiring_first() {
        let store = store_with(2);
        store.set(
            Namespace::RouteData,
            "soon",
            json!(1),
            Duration::from_secs(10),
        );
        store.set(
            Namespace::RouteData,
            "later",
            json!(2),
            Duration::from_secs(100),
        );
        store.set(
            Namespace::RouteData,
            "latest",
            json!(3),
            Duration::from_secs(1000),
        );

        assert_eq!(store.len(Namespace::RouteData), 2);
        assert!(store.get(Namespace::RouteData, "soon").is_none());
        assert_eq!(store.get(Namespace::RouteData, "later"), Some(json!(2)));
        assert_eq!(store.get(Namespace::RouteData, "latest"), Some(json!(3)));
    }

    #[test]
    fn stats_track_hits_and_misses_per_namespace() {
        let store = CacheStore::with_defaults();
        store.set(Namespace::Summary, "k", json!("s"), Duration::from_secs(60));

        let _ = store.get(Namespace::Summary, "k");
        let _ = store.get(Namespace::Summary, "k");
        let _ = store.get(Namespace::Summary, "missing");
        let _ = store.get(Namespace::RouteData, "missing");

        let stats = store.stats();
        assert_eq!(stats.summary.hits, 2);
        assert_eq!(stats.summary.misses, 1);
        assert!((stats.summary.hit_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.route_data.misses, 1);
        assert_eq!(stats.route_data.hit_rate, 0.0);
        assert_eq!(stats.retrieval.hits, 0);
    }

    #[test]
    fn reset_clears_entries_and_counters() {
        let store = CacheStore::with_defaults();
        store.set(Namespace::RouteData, "k", json!(1), Duration::from_secs(60));
        let _ = store.get(Namespace::RouteData, "k");

        store.reset();
        assert!(store.is_empty(Namespace::RouteData));
        let stats = store.stats();
        assert_eq!(stats.route_data.hits, 0);
        assert_eq!(stats.route_data.misses, 0);
    }

    #[test]
    fn concurrent_readers_and_writers_never_observe_partial_entries() {
        let store = Arc::new(store_with(64));
        let mut handles = Vec::new();

        for worker in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("k{}", i % 10);
                    store.set(
                        Namespace::RouteData,
                        key.clone(),
                        json!({"worker": worker, "i": i}),
                        Duration::from_secs(60),
                    );
                    if let Some(value) = store.get(Namespace::RouteData, &key) {
                        // A stored entry is always a complete object.
                        assert!(value.get("worker").is_some());
                        assert!(value.get("i").is_some());
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
