// Win probability from two team score distributions via a Gaussian
// approximation.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Error function
// ---------------------------------------------------------------------------

/// Gauss error function via the Abramowitz & Stegun rational approximation
/// (formula 7.1.26, max absolute error ~1.5e-7). The stdlib has no `erf`,
/// and this accuracy is far beyond what a fantasy projection needs.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t) * (-x * x).exp();

    sign * y
}

// ---------------------------------------------------------------------------
// Team distributions
// ---------------------------------------------------------------------------

/// z-score for the 90% two-sided confidence interval.
pub const Z_90: f64 = 1.645;

/// A team's projected score as (mean, variance).
#[derive(Debug, Clone, Copy)]
pub struct TeamDistribution {
    pub mean: f64,
    pub variance: f64,
}

impl TeamDistribution {
    pub fn new(mean: f64, variance: f64) -> Self {
        TeamDistribution { mean, variance }
    }

    /// Reconstruct a distribution from a stored 90% confidence interval.
    ///
    /// `width` is the full interval width `[mean - margin, mean + margin]`,
    /// i.e. `2 * 1.645 * sigma`, so `sigma = width / (2 * 1.645)`. Keep one
    /// sigma convention per computation path: a distribution built here must
    /// not be mixed with raw per-player variances for the same team.
    pub fn from_interval(mean: f64, width: f64) -> Self {
        let sigma = width.max(0.0) / (2.0 * Z_90);
        TeamDistribution {
            mean,
            variance: sigma * sigma,
        }
    }
}

// ---------------------------------------------------------------------------
// Win probability
// ---------------------------------------------------------------------------

/// Head-to-head win probability. `home + away == 1.0` within floating
/// tolerance.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WinProbability {
    pub home: f64,
    pub away: f64,
}

/// Convert two team distributions into a win probability.
///
/// The score difference is approximated as Gaussian with mean
/// `home.mean - away.mean` and variance `varH + varA` (negative inputs are
/// clamped to 0). With no variance at all the result is deterministic:
/// whoever leads wins outright, a dead tie is 0.5/0.5.
pub fn win_probability(home: TeamDistribution, away: TeamDistribution) -> WinProbability {
    let mean_diff = home.mean - away.mean;
    let variance_sum = home.variance.max(0.0) + away.variance.max(0.0);

    if variance_sum <= 0.0 {
        let home_probability = if mean_diff > 0.0 {
            1.0
        } else if mean_diff < 0.0 {
            0.0
        } else {
            0.5
        };
        return WinProbability {
            home: home_probability,
            away: 1.0 - home_probability,
        };
    }

    let z = mean_diff / variance_sum.sqrt();
    let home_probability = (0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))).clamp(0.0, 1.0);

    WinProbability {
        home: home_probability,
        away: 1.0 - home_probability,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
