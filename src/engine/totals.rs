// Team point aggregation.

use serde::Serialize;

use crate::engine::points::{round2, LockStatus, PlayerPointEstimate};

/// A team's aggregated point figures for the week.
///
/// `total_estimated == round2(actual + projected_remaining)` always holds;
/// the struct is derived on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamTotals {
    pub actual: f64,
    pub projected_remaining: f64,
    pub total_estimated: f64,
}

/// Sum a team's starter estimates into actual / projected-remaining / total.
///
/// Pure summation: locked players contribute to `actual`, upcoming players
/// to `projected_remaining`.
pub fn aggregate_totals<'a, I>(estimates: I) -> TeamTotals
where
    I: IntoIterator<Item = &'a PlayerPointEstimate>,
{
    let mut actual = 0.0;
    let mut projected_remaining = 0.0;

    for estimate in estimates {
        match estimate.status {
            LockStatus::Locked => actual += estimate.used,
            LockStatus::Upcoming => projected_remaining += estimate.used,
        }
    }

    let actual = round2(actual);
    let projected_remaining = round2(projected_remaining);
    TeamTotals {
        actual,
        projected_remaining,
        total_estimated: round2(actual + projected_remaining),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
