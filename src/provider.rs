// Snapshot sources: where the engine's input bundles come from.
//
// The engine consumes a `MatchupSnapshot` and does not care how it was
// produced. Sources implement `SnapshotSource`; `CachedSource` wraps any of
// them with the scoped TTL cache so repeated lookups within the TTL reuse
// the same snapshot.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CachePort, CacheScope, MemoryCache};
use crate::data::{DataError, MatchupSnapshot};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("snapshot failed validation: {0}")]
    Data(#[from] DataError),

    #[error("failed to encode snapshot for cache: {0}")]
    CacheEncode(#[source] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Supplies validated, immutable snapshots for a league/week.
pub trait SnapshotSource {
    fn fetch(&mut self, league: &str, week: u16) -> Result<MatchupSnapshot, SourceError>;
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// Reads a snapshot the host application exported as JSON. The file is
/// expected to already match the requested league/week; the CLI is a
/// single-league tool.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl SnapshotSource for FileSource {
    fn fetch(&mut self, _league: &str, _week: u16) -> Result<MatchupSnapshot, SourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot: MatchupSnapshot =
            serde_json::from_str(&raw).map_err(|source| SourceError::Json {
                path: self.path.clone(),
                source,
            })?;
        snapshot.validate()?;
        info!(
            league = %snapshot.league,
            week = snapshot.week,
            rosters = snapshot.rosters.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

/// Wraps a source with the league-scoped TTL cache.
pub struct CachedSource<S> {
    inner: S,
    cache: MemoryCache,
}

impl<S: SnapshotSource> CachedSource<S> {
    pub fn new(inner: S, cache: MemoryCache) -> Self {
        CachedSource { inner, cache }
    }

    /// Drop cached snapshots for the given scope (e.g. after a roster move).
    pub fn invalidate(&mut self, scope: CacheScope) {
        self.cache.invalidate(scope);
    }

    fn cache_key(league: &str, week: u16) -> String {
        format!("snapshot:league:{league}:week:{week}")
    }
}

impl<S: SnapshotSource> SnapshotSource for CachedSource<S> {
    fn fetch(&mut self, league: &str, week: u16) -> Result<MatchupSnapshot, SourceError> {
        let key = Self::cache_key(league, week);
        if let Some(value) = self.cache.get(&key) {
            if let Ok(snapshot) = serde_json::from_value::<MatchupSnapshot>(value) {
                debug!(key, "snapshot served from cache");
                return Ok(snapshot);
            }
            // A snapshot that no longer decodes is stale garbage.
            debug!(key, "cached snapshot undecodable; refetching");
        }

        let snapshot = self.inner.fetch(league, week)?;
        let encoded = serde_json::to_value(&snapshot).map_err(SourceError::CacheEncode)?;
        self.cache.put(&key, CacheScope::League, encoded);
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RosterRecord;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Source that counts how often the backing fetch actually runs.
    struct CountingSource {
        calls: usize,
    }

    impl SnapshotSource for CountingSource {
        fn fetch(&mut self, league: &str, week: u16) -> Result<MatchupSnapshot, SourceError> {
            self.calls += 1;
            Ok(MatchupSnapshot {
                league: league.to_string(),
                season: 2025,
                week,
                settings: Default::default(),
                rosters: vec![RosterRecord {
                    roster_id: 1,
                    owner_id: "u1".into(),
                    starters: vec![],
                    players: vec![],
                }],
                matchups: vec![],
                players: HashMap::new(),
                actuals: HashMap::new(),
                projections: HashMap::new(),
                history: HashMap::new(),
                owner_names: HashMap::new(),
                fetched_at: None,
            })
        }
    }

    #[test]
    fn cached_source_fetches_once_within_ttl() {
        let cache = MemoryCache::new(Duration::from_secs(300));
        let mut source = CachedSource::new(CountingSource { calls: 0 }, cache);

        let first = source.fetch("lg", 3).unwrap();
        let second = source.fetch("lg", 3).unwrap();
        assert_eq!(source.inner.calls, 1);
        assert_eq!(first.league, second.league);

        // Different week misses the cache.
        source.fetch("lg", 4).unwrap();
        assert_eq!(source.inner.calls, 2);
    }

    #[test]
    fn invalidation_forces_refetch() {
        let cache = MemoryCache::new(Duration::from_secs(300));
        let mut source = CachedSource::new(CountingSource { calls: 0 }, cache);

        source.fetch("lg", 3).unwrap();
        source.invalidate(CacheScope::League);
        source.fetch("lg", 3).unwrap();
        assert_eq!(source.inner.calls, 2);
    }

    #[test]
    fn file_source_round_trips_snapshot() {
        let dir = std::env::temp_dir().join("matchup-assistant-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");

        let mut backing = CountingSource { calls: 0 };
        let snapshot = backing.fetch("lg", 3).unwrap();
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let mut source = FileSource::new(&path);
        let loaded = source.fetch("lg", 3).unwrap();
        assert_eq!(loaded.league, "lg");
        assert_eq!(loaded.rosters.len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn file_source_missing_file_errors() {
        let mut source = FileSource::new("/nonexistent/snapshot.json");
        let err = source.fetch("lg", 1).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
