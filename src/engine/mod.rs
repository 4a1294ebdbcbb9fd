// Matchup projection and lineup optimization engine.
//
// Every module in here is a pure function of its inputs: all external data
// (rosters, matchups, stats, history) is fetched by collaborators ahead of
// time and handed in as an immutable snapshot. Nothing in `engine/` performs
// I/O, touches the cache, or mutates shared state.

pub mod matchup;
pub mod optimizer;
pub mod points;
pub mod slots;
pub mod totals;
pub mod volatility;
pub mod win_probability;

pub use matchup::{assemble_matchup, optimize_roster, MatchupView};
pub use optimizer::{optimize_lineup, OptimizationResult};
pub use points::{estimate_points, LockStatus, PlayerPointEstimate};
pub use slots::{resolve_slots, RosterSlot};
pub use totals::{aggregate_totals, TeamTotals};
pub use volatility::{compute_volatility, PlayerAnalysis, VolatilityMetrics};
pub use win_probability::{win_probability, TeamDistribution, WinProbability};
