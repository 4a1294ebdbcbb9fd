// Greedy slot-by-slot lineup optimization with a qualitative risk readout.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::config::EngineSettings;
use crate::data::PlayerId;
use crate::engine::points::round2;
use crate::engine::slots::{normalize_token, Position, RosterSlot};
use crate::engine::volatility::PlayerAnalysis;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One player assigned to one starting slot.
#[derive(Debug, Clone, Serialize)]
pub struct SlotAssignment {
    pub slot: String,
    pub player_id: PlayerId,
    pub projected_points: f64,
    pub confidence: f64,
}

/// The lineup as currently set.
#[derive(Debug, Clone, Serialize)]
pub struct Lineup {
    pub starters: Vec<SlotAssignment>,
    pub total_points: f64,
}

/// The recommended lineup and its projected gain over the current one.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizedLineup {
    pub starters: Vec<SlotAssignment>,
    pub total_points: f64,
    pub improvement: f64,
}

/// A single start/sit recommendation: promote this player into `slot`,
/// benching `replaces` if set.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub slot: String,
    pub replaces: Option<PlayerId>,
    pub projected_points: f64,
    pub point_gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Aggregate risk profile of the recommended lineup.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub avg_confidence: f64,
    pub avg_coefficient_of_variation: f64,
    pub high_volatility_picks: usize,
}

/// Complete optimization output. Computed per request, never persisted;
/// purely a function of its inputs.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub current_lineup: Lineup,
    pub optimized_lineup: OptimizedLineup,
    pub recommendations: HashMap<PlayerId, Recommendation>,
    pub player_analysis: Vec<PlayerAnalysis>,
    pub risk_assessment: RiskAssessment,
}

// ---------------------------------------------------------------------------
// Risk thresholds
// ---------------------------------------------------------------------------

const LOW_RISK_MIN_CONFIDENCE: f64 = 0.7;
const MEDIUM_RISK_MIN_CONFIDENCE: f64 = 0.5;
const MEDIUM_RISK_MAX_HIGH_VOLATILITY: usize = 2;

// ---------------------------------------------------------------------------
// Core algorithm
// ---------------------------------------------------------------------------

/// Assign the best available candidate to each slot, in slot order.
///
/// For each slot the unused candidates are filtered to those whose position
/// is in the slot's eligible set; if none qualify, ANY unused candidate may
/// fill the slot (eligibility is advisory, never blocking). The highest
/// `projected_points` wins, ties broken by higher `confidence_score`.
///
/// This is a greedy maximum-weight assignment, not an optimal bipartite
/// matching: an earlier slot can take a player a later, more restrictive
/// slot also needed. Resolving configured slots most-restrictive-first
/// limits the damage. If exact optimality is ever required, swap in a
/// weighted assignment solver behind this same signature.
pub fn optimize_lineup(
    candidates: &[PlayerAnalysis],
    current_starters: &[PlayerId],
    slots: &[RosterSlot],
    settings: &EngineSettings,
) -> OptimizationResult {
    let by_id: HashMap<&str, &PlayerAnalysis> = candidates
        .iter()
        .map(|c| (c.player_id.as_str(), c))
        .collect();

    let current_lineup = build_current_lineup(current_starters, &by_id);

    // Greedy pass over the resolved slots.
    let mut used: HashSet<&str> = HashSet::new();
    let mut chosen: Vec<SlotAssignment> = Vec::with_capacity(slots.len());
    let mut chosen_analyses: Vec<&PlayerAnalysis> = Vec::with_capacity(slots.len());

    for slot in slots {
        let unused: Vec<&PlayerAnalysis> = candidates
            .iter()
            .filter(|c| !used.contains(c.player_id.as_str()))
            .collect();
        if unused.is_empty() {
            debug!(slot = %slot.name, "candidate pool exhausted; leaving slot open");
            continue;
        }

        let eligible: Vec<&PlayerAnalysis> = unused
            .iter()
            .copied()
            .filter(|c| is_eligible(c, slot))
            .collect();

        let pool = if eligible.is_empty() {
            debug!(slot = %slot.name, "no positional candidate; falling back to full pool");
            &unused
        } else {
            &eligible
        };

        let Some(best) = pool
            .iter()
            .max_by(|a, b| {
                a.projected_points
                    .partial_cmp(&b.projected_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(
                        a.confidence_score
                            .partial_cmp(&b.confidence_score)
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
            })
            .copied()
        else {
            continue;
        };

        used.insert(best.player_id.as_str());
        chosen.push(SlotAssignment {
            slot: slot.name.clone(),
            player_id: best.player_id.clone(),
            projected_points: best.projected_points,
            confidence: best.confidence_score,
        });
        chosen_analyses.push(best);
    }

    let optimized_total = round2(chosen.iter().map(|a| a.projected_points).sum());
    let improvement = round2(optimized_total - current_lineup.total_points);

    let recommendations = build_recommendations(&chosen, current_starters, &by_id);
    let risk_assessment = assess_risk(&chosen_analyses, settings);

    OptimizationResult {
        current_lineup,
        optimized_lineup: OptimizedLineup {
            starters: chosen,
            total_points: optimized_total,
            improvement,
        },
        recommendations,
        player_analysis: candidates.to_vec(),
        risk_assessment,
    }
}

fn is_eligible(candidate: &PlayerAnalysis, slot: &RosterSlot) -> bool {
    match &candidate.position {
        Some(raw) => slot
            .eligible
            .contains(&Position::from_token(&normalize_token(raw))),
        None => false,
    }
}

fn build_current_lineup(
    current_starters: &[PlayerId],
    by_id: &HashMap<&str, &PlayerAnalysis>,
) -> Lineup {
    let starters: Vec<SlotAssignment> = current_starters
        .iter()
        .filter_map(|id| {
            let Some(analysis) = by_id.get(id.as_str()) else {
                debug!(player_id = %id, "starter missing from candidate pool");
                return None;
            };
            Some(SlotAssignment {
                slot: analysis
                    .position
                    .as_deref()
                    .map(normalize_token)
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                player_id: analysis.player_id.clone(),
                projected_points: analysis.projected_points,
                confidence: analysis.confidence_score,
            })
        })
        .collect();

    let total_points = round2(starters.iter().map(|a| a.projected_points).sum());
    Lineup {
        starters,
        total_points,
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// One entry per promoted bench player, keyed by player id.
///
/// Promoted players (highest projection first) are paired with displaced
/// starters (lowest projection first): the strongest promotion notionally
/// replaces the weakest benched starter. The pairing is presentational; the
/// lineup itself is already fixed by the greedy pass.
fn build_recommendations(
    chosen: &[SlotAssignment],
    current_starters: &[PlayerId],
    by_id: &HashMap<&str, &PlayerAnalysis>,
) -> HashMap<PlayerId, Recommendation> {
    let current: HashSet<&str> = current_starters.iter().map(String::as_str).collect();
    let chosen_ids: HashSet<&str> = chosen.iter().map(|a| a.player_id.as_str()).collect();

    let mut promoted: Vec<&SlotAssignment> = chosen
        .iter()
        .filter(|a| !current.contains(a.player_id.as_str()))
        .collect();
    promoted.sort_by(|a, b| {
        b.projected_points
            .partial_cmp(&a.projected_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut displaced: Vec<&PlayerAnalysis> = current_starters
        .iter()
        .filter(|id| !chosen_ids.contains(id.as_str()))
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect();
    displaced.sort_by(|a, b| {
        a.projected_points
            .partial_cmp(&b.projected_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut recommendations = HashMap::new();
    let mut displaced_iter = displaced.into_iter();
    for assignment in promoted {
        let replaces = displaced_iter.next();
        let point_gain = match replaces {
            Some(out) => round2(assignment.projected_points - out.projected_points),
            None => assignment.projected_points,
        };
        recommendations.insert(
            assignment.player_id.clone(),
            Recommendation {
                slot: assignment.slot.clone(),
                replaces: replaces.map(|out| out.player_id.clone()),
                projected_points: assignment.projected_points,
                point_gain,
            },
        );
    }
    recommendations
}

// ---------------------------------------------------------------------------
// Risk assessment
// ---------------------------------------------------------------------------

fn assess_risk(chosen: &[&PlayerAnalysis], settings: &EngineSettings) -> RiskAssessment {
    if chosen.is_empty() {
        return RiskAssessment {
            level: RiskLevel::High,
            avg_confidence: 0.0,
            avg_coefficient_of_variation: 0.0,
            high_volatility_picks: 0,
        };
    }

    let n = chosen.len() as f64;
    let avg_confidence = chosen.iter().map(|a| a.confidence_score).sum::<f64>() / n;
    let avg_cv = chosen
        .iter()
        .map(|a| a.volatility.coefficient_of_variation)
        .sum::<f64>()
        / n;
    let high_volatility_picks = chosen
        .iter()
        .filter(|a| a.volatility.coefficient_of_variation > settings.high_volatility_cv)
        .count();

    let level = if avg_confidence > LOW_RISK_MIN_CONFIDENCE && high_volatility_picks == 0 {
        RiskLevel::Low
    } else if avg_confidence > MEDIUM_RISK_MIN_CONFIDENCE
        && high_volatility_picks <= MEDIUM_RISK_MAX_HIGH_VOLATILITY
    {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    RiskAssessment {
        level,
        avg_confidence,
        avg_coefficient_of_variation: avg_cv,
        high_volatility_picks,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::slots::resolve_slots;
    use crate::engine::volatility::VolatilityMetrics;

    fn candidate(id: &str, position: &str, projected: f64, confidence: f64, cv: f64) -> PlayerAnalysis {
        PlayerAnalysis {
            player_id: id.into(),
            name: id.to_uppercase(),
            position: Some(position.into()),
            current_points: 0.0,
            projected_points: projected,
            volatility: VolatilityMetrics {
                std_dev: cv * projected.max(1.0),
                mean: projected,
                coefficient_of_variation: cv,
                games_analyzed: 10,
            },
            confidence_score: confidence,
            ceiling: projected + 5.0,
            floor: (projected - 5.0).max(0.0),
        }
    }

    fn slot_names(raw: &[&str]) -> Vec<RosterSlot> {
        resolve_slots(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    fn ids(lineup: &[SlotAssignment]) -> Vec<&str> {
        lineup.iter().map(|a| a.player_id.as_str()).collect()
    }

    #[test]
    fn picks_highest_projection_per_slot() {
        let candidates = vec![
            candidate("qb_low", "QB", 15.0, 0.8, 0.2),
            candidate("qb_high", "QB", 22.0, 0.6, 0.3),
            candidate("rb_a", "RB", 14.0, 0.7, 0.3),
        ];
        let slots = slot_names(&["QB", "RB"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());

        assert_eq!(ids(&result.optimized_lineup.starters), ["qb_high", "rb_a"]);
        assert_eq!(result.optimized_lineup.total_points, 36.0);
    }

    #[test]
    fn ties_broken_by_confidence() {
        let candidates = vec![
            candidate("shaky", "WR", 12.0, 0.4, 0.8),
            candidate("steady", "WR", 12.0, 0.9, 0.1),
        ];
        let slots = slot_names(&["WR"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());
        assert_eq!(ids(&result.optimized_lineup.starters), ["steady"]);
    }

    #[test]
    fn never_assigns_a_player_twice() {
        // The best RB is also the best FLEX candidate.
        let candidates = vec![
            candidate("rb_star", "RB", 20.0, 0.9, 0.2),
            candidate("rb_two", "RB", 11.0, 0.6, 0.4),
            candidate("wr_one", "WR", 13.0, 0.7, 0.3),
        ];
        let slots = slot_names(&["RB", "FLEX"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());

        let assigned = ids(&result.optimized_lineup.starters);
        assert_eq!(assigned.len(), 2);
        let unique: HashSet<&str> = assigned.iter().copied().collect();
        assert_eq!(unique.len(), 2);
        // RB slot (most restrictive) takes the star; FLEX gets the best rest.
        assert_eq!(assigned, ["rb_star", "wr_one"]);
    }

    #[test]
    fn falls_back_when_no_positional_candidate() {
        // A QB slot with no quarterback anywhere: eligibility is advisory.
        let candidates = vec![
            candidate("wr_one", "WR", 16.0, 0.7, 0.3),
            candidate("te_one", "TE", 9.0, 0.6, 0.4),
        ];
        let slots = slot_names(&["QB"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());
        assert_eq!(ids(&result.optimized_lineup.starters), ["wr_one"]);
    }

    #[test]
    fn leaves_slots_open_when_pool_exhausted() {
        let candidates = vec![candidate("only", "RB", 10.0, 0.7, 0.3)];
        let slots = slot_names(&["RB", "WR", "FLEX"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());
        assert_eq!(result.optimized_lineup.starters.len(), 1);
    }

    #[test]
    fn recommendations_cover_only_promoted_players() {
        let candidates = vec![
            candidate("starter_ok", "QB", 18.0, 0.8, 0.2),
            candidate("starter_weak", "RB", 6.0, 0.5, 0.5),
            candidate("bench_beast", "RB", 17.0, 0.8, 0.2),
        ];
        let current = vec!["starter_ok".to_string(), "starter_weak".to_string()];
        let slots = slot_names(&["QB", "RB"]);
        let result = optimize_lineup(&candidates, &current, &slots, &EngineSettings::default());

        assert_eq!(result.recommendations.len(), 1);
        let rec = &result.recommendations["bench_beast"];
        assert_eq!(rec.slot, "RB");
        assert_eq!(rec.replaces.as_deref(), Some("starter_weak"));
        assert_eq!(rec.point_gain, 11.0);
        assert_eq!(result.optimized_lineup.improvement, 11.0);
    }

    #[test]
    fn no_change_means_no_recommendations() {
        let candidates = vec![
            candidate("qb", "QB", 18.0, 0.8, 0.2),
            candidate("rb", "RB", 12.0, 0.8, 0.2),
        ];
        let current = vec!["qb".to_string(), "rb".to_string()];
        let slots = slot_names(&["QB", "RB"]);
        let result = optimize_lineup(&candidates, &current, &slots, &EngineSettings::default());

        assert!(result.recommendations.is_empty());
        assert_eq!(result.optimized_lineup.improvement, 0.0);
    }

    #[test]
    fn risk_low_when_confident_and_steady() {
        let candidates = vec![
            candidate("a", "QB", 20.0, 0.9, 0.2),
            candidate("b", "RB", 15.0, 0.8, 0.3),
        ];
        let slots = slot_names(&["QB", "RB"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());
        assert_eq!(result.risk_assessment.level, RiskLevel::Low);
        assert_eq!(result.risk_assessment.high_volatility_picks, 0);
    }

    #[test]
    fn risk_medium_with_some_volatility() {
        let candidates = vec![
            candidate("a", "QB", 20.0, 0.8, 0.7),
            candidate("b", "RB", 15.0, 0.6, 0.3),
        ];
        let slots = slot_names(&["QB", "RB"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());
        assert_eq!(result.risk_assessment.level, RiskLevel::Medium);
        assert_eq!(result.risk_assessment.high_volatility_picks, 1);
    }

    #[test]
    fn risk_high_when_boom_or_bust() {
        let candidates = vec![
            candidate("a", "QB", 20.0, 0.3, 0.9),
            candidate("b", "RB", 15.0, 0.4, 0.8),
            candidate("c", "WR", 12.0, 0.35, 0.7),
        ];
        let slots = slot_names(&["QB", "RB", "WR"]);
        let result = optimize_lineup(&candidates, &[], &slots, &EngineSettings::default());
        assert_eq!(result.risk_assessment.level, RiskLevel::High);
        assert_eq!(result.risk_assessment.high_volatility_picks, 3);
    }
}
