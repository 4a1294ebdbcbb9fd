// Matchup assembly: one league/week/roster in, one cohesive view model out.

use serde::Serialize;
use tracing::debug;

use crate::config::EngineSettings;
use crate::data::{DataError, MatchupSnapshot, PlayerId, RosterRecord};
use crate::engine::optimizer::{optimize_lineup, OptimizationResult};
use crate::engine::points::{estimate_points, LockStatus, PlayerPointEstimate};
use crate::engine::slots::{infer_slots, resolve_slots, RosterSlot};
use crate::engine::totals::{aggregate_totals, TeamTotals};
use crate::engine::volatility::{analyze_player, compute_volatility, PlayerAnalysis};
use crate::engine::win_probability::{win_probability, TeamDistribution, WinProbability};

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// A roster the consumer can switch perspective to.
#[derive(Debug, Clone, Serialize)]
pub struct RosterOption {
    pub roster_id: i64,
    pub owner_id: String,
    pub owner_name: String,
}

/// One side of the matchup.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSide {
    pub roster_id: i64,
    pub owner_id: String,
    pub owner_name: String,
    pub starters: Vec<PlayerId>,
    /// Used point figures, parallel to `starters`.
    pub points: Vec<f64>,
    pub totals: TeamTotals,
}

/// A fully resolved head-to-head matchup.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupSummary {
    pub league: String,
    pub season: u16,
    pub week: u16,
    pub home: TeamSide,
    pub away: TeamSide,
    pub win_probability: WinProbability,
    pub roster_options: Vec<RosterOption>,
}

/// Returned when no valid pairing exists for the requested roster. This is
/// an expected condition (bye weeks, mid-season roster churn), reported as a
/// value rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupMiss {
    pub league: String,
    pub season: u16,
    pub week: u16,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MatchupView {
    Matchup(Box<MatchupSummary>),
    NoMatchup(MatchupMiss),
}

// ---------------------------------------------------------------------------
// Matchup assembly
// ---------------------------------------------------------------------------

/// Assemble the matchup view for `roster_id`'s pairing this week.
///
/// The requested roster is always the home side of the view. Fails only on
/// contract violations (malformed snapshot, a matchup record pointing at a
/// roster the snapshot does not contain); a missing pairing produces a
/// `NoMatchup` view instead.
pub fn assemble_matchup(
    snapshot: &MatchupSnapshot,
    settings: &EngineSettings,
    roster_id: i64,
) -> Result<MatchupView, DataError> {
    snapshot.validate()?;

    let Some(mine) = snapshot
        .matchups
        .iter()
        .find(|m| m.roster_id == roster_id)
    else {
        return Ok(miss(
            snapshot,
            format!("no matchup found for roster {roster_id} in week {}", snapshot.week),
        ));
    };

    let Some(theirs) = snapshot
        .matchups
        .iter()
        .find(|m| m.matchup_id == mine.matchup_id && m.roster_id != roster_id)
    else {
        return Ok(miss(
            snapshot,
            format!(
                "no opponent found for roster {roster_id} (matchup {}) in week {}",
                mine.matchup_id, snapshot.week
            ),
        ));
    };

    let home_roster = snapshot.roster(mine.roster_id)?;
    let away_roster = snapshot.roster(theirs.roster_id)?;

    let (home, home_variance) = build_side(snapshot, settings, home_roster);
    let (away, away_variance) = build_side(snapshot, settings, away_roster);

    let probability = win_probability(
        TeamDistribution::new(home.totals.total_estimated, home_variance),
        TeamDistribution::new(away.totals.total_estimated, away_variance),
    );
    debug!(
        home = home.roster_id,
        away = away.roster_id,
        p_home = probability.home,
        "assembled matchup"
    );

    Ok(MatchupView::Matchup(Box::new(MatchupSummary {
        league: snapshot.league.clone(),
        season: snapshot.season,
        week: snapshot.week,
        home,
        away,
        win_probability: probability,
        roster_options: roster_options(snapshot),
    })))
}

fn miss(snapshot: &MatchupSnapshot, error: String) -> MatchupView {
    MatchupView::NoMatchup(MatchupMiss {
        league: snapshot.league.clone(),
        season: snapshot.season,
        week: snapshot.week,
        error,
    })
}

fn roster_options(snapshot: &MatchupSnapshot) -> Vec<RosterOption> {
    let mut options: Vec<RosterOption> = snapshot
        .rosters
        .iter()
        .map(|r| RosterOption {
            roster_id: r.roster_id,
            owner_id: r.owner_id.clone(),
            owner_name: snapshot.owner_name(&r.owner_id),
        })
        .collect();
    options.sort_by_key(|o| o.roster_id);
    options
}

/// Build one side's estimates, totals, and aggregate score variance.
///
/// Team variance sums each upcoming starter's historical variance; locked
/// starters have a known score and contribute nothing. With every game
/// final, the variance is 0 and the win probability degenerates to the
/// actual result.
fn build_side(
    snapshot: &MatchupSnapshot,
    settings: &EngineSettings,
    roster: &RosterRecord,
) -> (TeamSide, f64) {
    let estimates: Vec<PlayerPointEstimate> = roster
        .starters
        .iter()
        .map(|id| estimate_points(id, snapshot.actuals.get(id), snapshot.projections.get(id)))
        .collect();

    let variance: f64 = estimates
        .iter()
        .filter(|e| e.status == LockStatus::Upcoming)
        .map(|e| {
            let history = snapshot
                .history
                .get(&e.player_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            compute_volatility(history, settings).variance()
        })
        .sum();

    let totals = aggregate_totals(&estimates);
    let side = TeamSide {
        roster_id: roster.roster_id,
        owner_id: roster.owner_id.clone(),
        owner_name: snapshot.owner_name(&roster.owner_id),
        starters: roster.starters.clone(),
        points: estimates.iter().map(|e| e.used).collect(),
        totals,
    };
    (side, variance)
}

// ---------------------------------------------------------------------------
// Lineup optimization entry point
// ---------------------------------------------------------------------------

/// Run lineup optimization for one roster: candidate pool is starters plus
/// bench, slots come from league settings or are inferred from the current
/// starters when the league has no configured positions.
pub fn optimize_roster(
    snapshot: &MatchupSnapshot,
    settings: &EngineSettings,
    roster_id: i64,
) -> Result<OptimizationResult, DataError> {
    snapshot.validate()?;
    let roster = snapshot.roster(roster_id)?;

    let candidates = candidate_pool(snapshot, settings, roster);
    let slots = slots_for_roster(snapshot, roster);

    Ok(optimize_lineup(
        &candidates,
        &roster.starters,
        &slots,
        settings,
    ))
}

/// Starters first, then bench players not already listed.
fn candidate_pool(
    snapshot: &MatchupSnapshot,
    settings: &EngineSettings,
    roster: &RosterRecord,
) -> Vec<PlayerAnalysis> {
    let mut seen: Vec<&str> = Vec::new();
    let mut candidates = Vec::new();

    for id in roster.starters.iter().chain(&roster.players) {
        if seen.contains(&id.as_str()) {
            continue;
        }
        seen.push(id);

        let record = snapshot.players.get(id);
        let (name, position) = match record {
            Some(r) => (r.name.as_str(), r.position.as_deref()),
            None => {
                debug!(player_id = %id, "no player record; using id as name");
                (id.as_str(), None)
            }
        };

        let estimate =
            estimate_points(id, snapshot.actuals.get(id), snapshot.projections.get(id));
        let history = snapshot.history.get(id).map(Vec::as_slice).unwrap_or(&[]);
        candidates.push(analyze_player(name, position, &estimate, history, settings));
    }

    candidates
}

fn slots_for_roster(snapshot: &MatchupSnapshot, roster: &RosterRecord) -> Vec<RosterSlot> {
    let configured = resolve_slots(&snapshot.settings.roster_positions);
    if !configured.is_empty() {
        return configured;
    }

    debug!(
        roster_id = roster.roster_id,
        "no configured roster positions; inferring slots from starters"
    );
    infer_slots(roster.starters.iter().map(|id| {
        (
            id.as_str(),
            snapshot
                .players
                .get(id)
                .and_then(|p| p.position.as_deref()),
        )
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
