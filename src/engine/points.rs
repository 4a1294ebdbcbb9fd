// Per-player point estimation: actual vs. projected resolution and lock status.

use serde::{Deserialize, Serialize};

use crate::data::WeeklyScore;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether a player's game for the week has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    /// Game completed; the actual score is authoritative.
    Locked,
    /// Game not yet played; the projection stands in.
    Upcoming,
}

/// Resolved point estimate for one (player, season, week).
///
/// Invariant: `used == actual` iff `status == Locked`, otherwise
/// `used == projected`. Computed fresh per query and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPointEstimate {
    pub player_id: String,
    pub actual: f64,
    pub projected: f64,
    pub used: f64,
    pub status: LockStatus,
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to 2 decimal places. All point figures leaving the engine go
/// through this so view models and totals agree digit-for-digit.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Resolve a player's point estimate from the week's stat and projection
/// records.
///
/// Lock detection is presence-based: the player is `Locked` when a stat
/// record exists for the week AND carries a points figure. A recorded zero
/// therefore locks correctly (a real 0.00 outing), while a record with no
/// points yet (`points: null`) is treated the same as no record at all.
/// Value-based checks (`actual > 0`) misclassify real zero scores; this
/// crate uses presence everywhere.
///
/// Missing projection data defaults to 0.0 rather than failing: an absent
/// projection is an expected condition (bye weeks, practice-squad players),
/// not a contract violation.
pub fn estimate_points(
    player_id: &str,
    actual: Option<&WeeklyScore>,
    projected: Option<&WeeklyScore>,
) -> PlayerPointEstimate {
    let actual_points = actual.and_then(|s| s.points);
    let projected_points = round2(projected.and_then(|s| s.points).unwrap_or(0.0));

    match actual_points {
        Some(points) => {
            let points = round2(points);
            PlayerPointEstimate {
                player_id: player_id.to_string(),
                actual: points,
                projected: projected_points,
                used: points,
                status: LockStatus::Locked,
            }
        }
        None => PlayerPointEstimate {
            player_id: player_id.to_string(),
            actual: 0.0,
            projected: projected_points,
            used: projected_points,
            status: LockStatus::Upcoming,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
