// Scoped TTL cache for the data-fetch layer.
//
// The engine never touches this: it computes deterministically from whatever
// snapshot it is handed, and freshness is the caller's problem. The cache
// fronts the external fetches (league settings, rosters, stats) with a
// short TTL and explicit scoped invalidation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Invalidation scope attached to every entry. Invalidating a scope drops
/// all entries tagged with it; `All` clears everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    User,
    League,
    Season,
    All,
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Cache port injected into data-fetch collaborators.
pub trait CachePort {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&mut self, key: &str, scope: CacheScope, value: Value);
    fn invalidate(&mut self, scope: CacheScope);
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

struct CacheEntry {
    value: Value,
    scope: CacheScope,
    inserted_at: Instant,
}

/// Time-boxed in-memory cache keyed by caller-chosen strings
/// (league/week/scope keys in practice).
pub struct MemoryCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        MemoryCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.inserted_at.elapsed() < self.ttl
    }
}

impl CachePort for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if self.is_fresh(entry) => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    fn put(&mut self, key: &str, scope: CacheScope, value: Value) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                scope,
                inserted_at: Instant::now(),
            },
        );
    }

    fn invalidate(&mut self, scope: CacheScope) {
        let before = self.entries.len();
        match scope {
            CacheScope::All => self.entries.clear(),
            scope => self.entries.retain(|_, e| e.scope != scope),
        }
        debug!(dropped = before - self.entries.len(), ?scope, "cache invalidated");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
