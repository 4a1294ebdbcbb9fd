// Roster slot resolution: league roster-position tokens -> ordered starting
// slots with position eligibility.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::warn;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Player positions used for slot eligibility.
///
/// Tokens outside the fixed NFL set (e.g. IDP slots like "LB") are carried
/// through as `Other` so an unrecognized league configuration still resolves
/// to exact-position slots instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
    Other(String),
}

impl Position {
    /// Parse a normalized roster/position token into a `Position`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "QB" => Position::QB,
            "RB" => Position::RB,
            "WR" => Position::WR,
            "TE" => Position::TE,
            "K" => Position::K,
            "DEF" | "DST" | "D_ST" => Position::DEF,
            other => Position::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
            Position::Other(token) => token,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Token normalization
// ---------------------------------------------------------------------------

/// Roster tokens that are not starting slots.
const BENCH_TOKENS: &[&str] = &["BN", "BENCH", "TAXI", "IR", "RESERVE"];

/// Normalize a roster-position token: uppercase, with runs of spaces,
/// hyphens, and slashes collapsed to a single underscore. "rec flex",
/// "Rec-Flex", and "REC/FLEX" all normalize to "REC_FLEX".
pub fn normalize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        match ch {
            ' ' | '-' | '/' | '_' => pending_separator = !out.is_empty(),
            c => {
                if pending_separator {
                    out.push('_');
                    pending_separator = false;
                }
                out.extend(c.to_uppercase());
            }
        }
    }
    out
}

fn is_bench_token(normalized: &str) -> bool {
    BENCH_TOKENS.contains(&normalized)
}

// ---------------------------------------------------------------------------
// Slot resolution
// ---------------------------------------------------------------------------

/// A starting slot and the positions eligible to fill it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSlot {
    pub name: String,
    pub eligible: BTreeSet<Position>,
}

impl RosterSlot {
    fn exact(name: String) -> Self {
        let eligible = BTreeSet::from([Position::from_token(&name)]);
        RosterSlot { name, eligible }
    }

    fn flex(name: String, positions: &[Position]) -> Self {
        RosterSlot {
            name,
            eligible: positions.iter().cloned().collect(),
        }
    }
}

/// Map a normalized token to its eligible-position set.
///
/// Unrecognized tokens become exact-position slots rather than errors, so
/// exotic league formats degrade gracefully.
fn slot_for_token(normalized: String) -> RosterSlot {
    match normalized.as_str() {
        "FLEX" | "WRRBTE" | "WRT" | "WRRB" => {
            RosterSlot::flex(normalized, &[Position::WR, Position::RB, Position::TE])
        }
        "REC_FLEX" | "WRTE" => RosterSlot::flex(normalized, &[Position::WR, Position::TE]),
        "RBWR" => RosterSlot::flex(normalized, &[Position::RB, Position::WR]),
        "SUPER_FLEX" | "SF" => RosterSlot::flex(
            normalized,
            &[Position::QB, Position::WR, Position::RB, Position::TE],
        ),
        _ => RosterSlot::exact(normalized),
    }
}

/// Resolve the ordered list of starting slots from a league's configured
/// roster-position tokens.
///
/// Bench-like tokens (BN, BENCH, TAXI, IR, RESERVE) are discarded. The
/// result is sorted ascending by eligible-set size so the most restrictive
/// slots are filled first during greedy assignment; the sort is stable, so
/// slots with equal flexibility keep their configured order. This ordering
/// reduces greedy mis-assignment but does not make the assignment globally
/// optimal.
pub fn resolve_slots(roster_positions: &[String]) -> Vec<RosterSlot> {
    let mut slots: Vec<RosterSlot> = roster_positions
        .iter()
        .map(|raw| normalize_token(raw))
        .filter(|token| !token.is_empty() && !is_bench_token(token))
        .map(slot_for_token)
        .collect();

    slots.sort_by_key(|slot| slot.eligible.len());
    slots
}

/// Infer slots from a team's current starters when no league configuration
/// is available: one exact-position slot per starter, in starter order.
///
/// Starters whose position is unknown are dropped; there is nothing to
/// anchor a slot to.
pub fn infer_slots<'a, I>(starter_positions: I) -> Vec<RosterSlot>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    starter_positions
        .into_iter()
        .filter_map(|(player_id, position)| match position {
            Some(raw) => {
                let token = normalize_token(raw);
                if token.is_empty() {
                    None
                } else {
                    Some(RosterSlot::exact(token))
                }
            }
            None => {
                warn!(player_id, "starter has no known position; dropping slot");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn eligible(slot: &RosterSlot) -> Vec<&str> {
        slot.eligible.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn flex_eligibility_table() {
        let slots = resolve_slots(&positions(&["FLEX", "SUPER_FLEX", "REC_FLEX", "RBWR"]));
        let by_name = |name: &str| slots.iter().find(|s| s.name == name).unwrap();

        assert_eq!(eligible(by_name("FLEX")), ["RB", "WR", "TE"]);
        assert_eq!(eligible(by_name("SUPER_FLEX")), ["QB", "RB", "WR", "TE"]);
        assert_eq!(eligible(by_name("REC_FLEX")), ["WR", "TE"]);
        assert_eq!(eligible(by_name("RBWR")), ["RB", "WR"]);
    }

    #[test]
    fn bench_tokens_discarded() {
        // Scenario: QB/RB/WR/FLEX starters plus bench and IR slots.
        let slots = resolve_slots(&positions(&["QB", "RB", "WR", "FLEX", "BN", "BN", "IR"]));
        let names: Vec<&str> = slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["QB", "RB", "WR", "FLEX"]);
    }

    #[test]
    fn most_restrictive_first() {
        let slots = resolve_slots(&positions(&["SUPER_FLEX", "FLEX", "REC_FLEX", "QB", "TE"]));
        let sizes: Vec<usize> = slots.iter().map(|s| s.eligible.len()).collect();
        assert_eq!(sizes, [1, 1, 2, 3, 4]);
        // Stable sort: QB configured before TE, both size 1.
        assert_eq!(slots[0].name, "QB");
        assert_eq!(slots[1].name, "TE");
    }

    #[test]
    fn token_normalization_variants() {
        assert_eq!(normalize_token("rec flex"), "REC_FLEX");
        assert_eq!(normalize_token("Super-Flex"), "SUPER_FLEX");
        assert_eq!(normalize_token("  flex "), "FLEX");
        assert_eq!(normalize_token("super - flex"), "SUPER_FLEX");
    }

    #[test]
    fn slash_collapses_to_underscore() {
        // "WR/TE" normalizes to "WR_TE", which is not in the flex table and
        // falls through to an exact (pass-through) slot.
        assert_eq!(normalize_token("WR/TE"), "WR_TE");
        let slots = resolve_slots(&positions(&["WR/TE"]));
        assert_eq!(slots[0].name, "WR_TE");
        assert_eq!(slots[0].eligible.len(), 1);
    }

    #[test]
    fn unrecognized_token_is_exact_slot() {
        let slots = resolve_slots(&positions(&["LB"]));
        assert_eq!(slots.len(), 1);
        assert_eq!(
            slots[0].eligible,
            BTreeSet::from([Position::Other("LB".into())])
        );
    }

    #[test]
    fn dst_aliases_map_to_def() {
        assert_eq!(Position::from_token("DST"), Position::DEF);
        assert_eq!(Position::from_token(&normalize_token("D/ST")), Position::DEF);
    }

    #[test]
    fn inferred_slots_follow_starters() {
        let slots = infer_slots([
            ("p1", Some("QB")),
            ("p2", Some("rb")),
            ("p3", None),
            ("p4", Some("WR")),
        ]);
        let names: Vec<&str> = slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["QB", "RB", "WR"]);
    }

    #[test]
    fn empty_config_resolves_to_no_slots() {
        assert!(resolve_slots(&[]).is_empty());
        assert!(resolve_slots(&positions(&["BN", "TAXI"])).is_empty());
    }
}
