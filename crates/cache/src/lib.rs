//! # Feedchat Cache
//!
//! Namespaced, time-bounded in-memory key/value store shared by the query
//! resolver and the orchestrator. Three namespaces with independent TTLs
//! (`route-data`, `retrieval`, `summary`), lazy purge of expired entries,
//! oldest-expiring-first eviction under capacity pressure, and per-namespace
//! hit/miss statistics.
//!
//! The store is an explicitly constructed instance passed by reference
//! (usually `Arc<CacheStore>`), never a process-wide singleton, and
//! exposes `reset()` for test isolation.

mod config;
mod key;
mod store;

pub use config::CacheConfig;
pub use key::canonical_key;
pub use store::{CacheStats, CacheStore, Namespace, NamespaceStats};
