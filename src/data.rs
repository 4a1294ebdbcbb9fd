// Boundary records supplied by the data-fetch collaborators.
//
// Everything here is a typed snapshot of loosely-shaped JSON from the host
// application (league settings, rosters, matchup pairings, stat lookups).
// Records are validated once at ingestion; the engine assumes a validated
// snapshot and never re-fetches mid-computation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PlayerId = String;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Contract violations by the data-fetch collaborator. Expected
/// absence-of-data (missing stats, empty history, unknown slot tokens) is
/// handled with defaults elsewhere and never raises these.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("roster {roster_id} contains an entry with no player id")]
    MissingPlayerId { roster_id: i64 },

    #[error("roster {roster_id} has no owner id")]
    MissingOwnerId { roster_id: i64 },

    #[error("no roster with id {roster_id} in snapshot")]
    UnknownRoster { roster_id: i64 },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// League configuration relevant to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSettings {
    /// Ordered roster-position tokens (e.g. "QB", "FLEX", "BN"). May be
    /// empty, in which case slots are inferred from current starters.
    #[serde(default)]
    pub roster_positions: Vec<String>,
}

/// One team's roster for the week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRecord {
    pub roster_id: i64,
    pub owner_id: String,
    /// Players currently in starting slots, in slot order.
    #[serde(default)]
    pub starters: Vec<PlayerId>,
    /// All rostered players (starters + bench).
    #[serde(default)]
    pub players: Vec<PlayerId>,
}

/// A roster's matchup pairing for the week. Two records sharing a
/// `matchup_id` are opponents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub roster_id: i64,
    pub matchup_id: i64,
}

/// Static player identity data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
}

/// A single stat or projection lookup result: the PPR points figure for one
/// (player, season, week), or `None` when the source has no figure yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub points: Option<f64>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable bundle of everything the engine needs for one league/week.
///
/// The snapshot is scoped to a single (season, week), so the per-player maps
/// realize the `(player_id, season, week)` lookup keying. Cache freshness is
/// the caller's responsibility; the engine computes deterministically from
/// whatever snapshot it receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupSnapshot {
    pub league: String,
    pub season: u16,
    pub week: u16,
    #[serde(default)]
    pub settings: LeagueSettings,
    pub rosters: Vec<RosterRecord>,
    #[serde(default)]
    pub matchups: Vec<MatchupRecord>,
    /// Player identity records keyed by player id.
    #[serde(default)]
    pub players: HashMap<PlayerId, PlayerRecord>,
    /// Actual stat records for the week. Presence of an entry with a points
    /// figure is the lock signal.
    #[serde(default)]
    pub actuals: HashMap<PlayerId, WeeklyScore>,
    /// Projection records for the week.
    #[serde(default)]
    pub projections: HashMap<PlayerId, WeeklyScore>,
    /// Historical PPR scores per player, oldest first, `None` for games
    /// without a defined score. At most the trailing 16 games are used.
    #[serde(default)]
    pub history: HashMap<PlayerId, Vec<Option<f64>>>,
    /// Owner display names keyed by owner id.
    #[serde(default)]
    pub owner_names: HashMap<String, String>,
    /// When the data layer fetched this snapshot. Used only for staleness
    /// logging; never consulted by the engine.
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl MatchupSnapshot {
    /// Validate required identifiers. Runs once at ingestion so malformed
    /// records are rejected at the boundary, not deep inside the algorithm.
    pub fn validate(&self) -> Result<(), DataError> {
        for roster in &self.rosters {
            if roster.owner_id.trim().is_empty() {
                return Err(DataError::MissingOwnerId {
                    roster_id: roster.roster_id,
                });
            }
            let empty_entry = roster
                .starters
                .iter()
                .chain(&roster.players)
                .any(|id| id.trim().is_empty());
            if empty_entry {
                return Err(DataError::MissingPlayerId {
                    roster_id: roster.roster_id,
                });
            }
        }
        Ok(())
    }

    pub fn roster(&self, roster_id: i64) -> Result<&RosterRecord, DataError> {
        self.rosters
            .iter()
            .find(|r| r.roster_id == roster_id)
            .ok_or(DataError::UnknownRoster { roster_id })
    }

    /// Owner display name with the owner id as fallback.
    pub fn owner_name(&self, owner_id: &str) -> String {
        self.owner_names
            .get(owner_id)
            .cloned()
            .unwrap_or_else(|| owner_id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_roster(roster: RosterRecord) -> MatchupSnapshot {
        MatchupSnapshot {
            league: "test".into(),
            season: 2025,
            week: 3,
            settings: LeagueSettings::default(),
            rosters: vec![roster],
            matchups: vec![],
            players: HashMap::new(),
            actuals: HashMap::new(),
            projections: HashMap::new(),
            history: HashMap::new(),
            owner_names: HashMap::new(),
            fetched_at: None,
        }
    }

    #[test]
    fn valid_snapshot_passes() {
        let snapshot = snapshot_with_roster(RosterRecord {
            roster_id: 1,
            owner_id: "owner_a".into(),
            starters: vec!["p1".into(), "p2".into()],
            players: vec!["p1".into(), "p2".into(), "p3".into()],
        });
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn empty_player_id_rejected() {
        let snapshot = snapshot_with_roster(RosterRecord {
            roster_id: 4,
            owner_id: "owner_a".into(),
            starters: vec!["p1".into(), "  ".into()],
            players: vec![],
        });
        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, DataError::MissingPlayerId { roster_id: 4 }));
    }

    #[test]
    fn missing_owner_rejected() {
        let snapshot = snapshot_with_roster(RosterRecord {
            roster_id: 2,
            owner_id: "".into(),
            starters: vec![],
            players: vec![],
        });
        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, DataError::MissingOwnerId { roster_id: 2 }));
    }

    #[test]
    fn unknown_roster_lookup_errors() {
        let snapshot = snapshot_with_roster(RosterRecord {
            roster_id: 1,
            owner_id: "owner_a".into(),
            starters: vec![],
            players: vec![],
        });
        assert!(snapshot.roster(1).is_ok());
        assert!(matches!(
            snapshot.roster(9),
            Err(DataError::UnknownRoster { roster_id: 9 })
        ));
    }

    #[test]
    fn owner_name_falls_back_to_id() {
        let mut snapshot = snapshot_with_roster(RosterRecord {
            roster_id: 1,
            owner_id: "owner_a".into(),
            starters: vec![],
            players: vec![],
        });
        snapshot
            .owner_names
            .insert("owner_a".into(), "Team Alpha".into());
        assert_eq!(snapshot.owner_name("owner_a"), "Team Alpha");
        assert_eq!(snapshot.owner_name("owner_b"), "owner_b");
    }

    #[test]
    fn snapshot_deserializes_from_sparse_json() {
        // The host application may omit every optional section.
        let raw = r#"{
            "league": "friends-and-family",
            "season": 2025,
            "week": 7,
            "rosters": [
                {"roster_id": 1, "owner_id": "u1", "starters": ["p1"], "players": ["p1", "p2"]}
            ]
        }"#;
        let snapshot: MatchupSnapshot = serde_json::from_str(raw).unwrap();
        assert!(snapshot.validate().is_ok());
        assert!(snapshot.matchups.is_empty());
        assert!(snapshot.settings.roster_positions.is_empty());
    }
}
