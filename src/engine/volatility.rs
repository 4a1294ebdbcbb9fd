// Historical scoring volatility and per-player analysis.

use serde::Serialize;

use crate::config::EngineSettings;
use crate::engine::points::{round2, PlayerPointEstimate};

// ---------------------------------------------------------------------------
// Volatility metrics
// ---------------------------------------------------------------------------

/// Week-to-week scoring volatility derived from a player's recent history.
#[derive(Debug, Clone, Serialize)]
pub struct VolatilityMetrics {
    pub std_dev: f64,
    pub mean: f64,
    pub coefficient_of_variation: f64,
    pub games_analyzed: usize,
}

impl VolatilityMetrics {
    /// The "unknown player" prior: no history at all. A ~6 point weekly
    /// std-dev is a typical spread for a mid-roster fantasy player, and a
    /// CV of 1.0 marks the projection as maximally uncertain.
    pub fn unknown_player(settings: &EngineSettings) -> Self {
        VolatilityMetrics {
            std_dev: settings.unknown_player_std_dev,
            mean: 0.0,
            coefficient_of_variation: 1.0,
            games_analyzed: 0,
        }
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

/// Compute volatility metrics from a player's historical PPR scores.
///
/// `history` is ordered oldest-first; entries without a defined score (bye
/// weeks, inactive games) are filtered out before the window is applied, and
/// only the most recent `volatility_window` remaining games are analyzed.
///
/// Variance uses the unbiased sample estimator (`n - 1` denominator)
/// throughout the crate. A single game gives no spread information, so one
/// game keeps the unknown-player std-dev prior while adopting the observed
/// mean.
pub fn compute_volatility(history: &[Option<f64>], settings: &EngineSettings) -> VolatilityMetrics {
    let scores: Vec<f64> = history.iter().filter_map(|s| *s).collect();
    let start = scores.len().saturating_sub(settings.volatility_window);
    let window = &scores[start..];

    if window.is_empty() {
        return VolatilityMetrics::unknown_player(settings);
    }

    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;

    let std_dev = if window.len() < 2 {
        settings.unknown_player_std_dev
    } else {
        let variance = window.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    };

    let coefficient_of_variation = if mean > 0.0 { std_dev / mean } else { 1.0 };

    VolatilityMetrics {
        std_dev,
        mean,
        coefficient_of_variation,
        games_analyzed: window.len(),
    }
}

// ---------------------------------------------------------------------------
// Confidence score
// ---------------------------------------------------------------------------

/// Combine volatility and scoring strength into a confidence score in [0, 1].
///
/// `volatility_weight * max(0, 1 - CV)` rewards consistency;
/// `scoring_weight * min(1, projected / projection_norm)` rewards players
/// whose projection is strong enough to matter.
pub fn confidence_score(
    metrics: &VolatilityMetrics,
    projected_points: f64,
    settings: &EngineSettings,
) -> f64 {
    let consistency = (1.0 - metrics.coefficient_of_variation).max(0.0);
    let strength = (projected_points / settings.projection_norm).min(1.0).max(0.0);
    let score = settings.volatility_weight * consistency + settings.scoring_weight * strength;
    score.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Per-player analysis
// ---------------------------------------------------------------------------

/// Everything the optimizer needs to know about one candidate player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAnalysis {
    pub player_id: String,
    pub name: String,
    pub position: Option<String>,
    /// Points already banked this week (0.0 until the game locks).
    pub current_points: f64,
    /// Best estimate of the week's final score: the actual once locked,
    /// otherwise the projection.
    pub projected_points: f64,
    pub volatility: VolatilityMetrics,
    pub confidence_score: f64,
    /// `projected + swing_multiplier * std_dev`.
    pub ceiling: f64,
    /// `max(0, projected - swing_multiplier * std_dev)`.
    pub floor: f64,
}

/// Build a `PlayerAnalysis` from a resolved point estimate and scoring
/// history.
pub fn analyze_player(
    name: &str,
    position: Option<&str>,
    estimate: &PlayerPointEstimate,
    history: &[Option<f64>],
    settings: &EngineSettings,
) -> PlayerAnalysis {
    let volatility = compute_volatility(history, settings);
    let projected_points = estimate.used;
    let confidence = confidence_score(&volatility, projected_points, settings);
    let swing = settings.swing_multiplier * volatility.std_dev;

    PlayerAnalysis {
        player_id: estimate.player_id.clone(),
        name: name.to_string(),
        position: position.map(|p| p.to_string()),
        current_points: estimate.actual,
        projected_points,
        confidence_score: confidence,
        ceiling: round2(projected_points + swing),
        floor: round2((projected_points - swing).max(0.0)),
        volatility,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
