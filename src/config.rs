// Configuration loading and parsing (league.toml).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Top-level deserialization target for league.toml.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    league: LeagueConfig,
    #[serde(default)]
    engine: EngineSettings,
    #[serde(default)]
    cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub platform: String,
    pub num_teams: usize,
    pub scoring_type: String,
    /// Ordered roster-position tokens (starters + bench slots). Used as a
    /// fallback when a snapshot arrives without league settings; the
    /// snapshot's own settings win when present.
    #[serde(default)]
    pub roster_positions: Vec<String>,
    /// Optional static owner display names, keyed by owner id.
    #[serde(default)]
    pub owners: HashMap<String, String>,
}

/// Engine tuning constants. Every field has a default matching the shipped
/// model; league.toml's `[engine]` table can override them individually.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Historical games considered for volatility (most recent N).
    pub volatility_window: usize,
    /// Std-dev prior for players with no scoring history.
    pub unknown_player_std_dev: f64,
    /// Weight of (1 - CV) in the confidence score.
    pub volatility_weight: f64,
    /// Weight of scoring strength in the confidence score.
    pub scoring_weight: f64,
    /// Projected points treated as a "full confidence" scoring week.
    pub projection_norm: f64,
    /// Std-dev multiplier for ceiling/floor bands.
    pub swing_multiplier: f64,
    /// CV above which a player counts as a high-volatility pick.
    pub high_volatility_cv: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            volatility_window: 16,
            unknown_player_std_dev: 6.0,
            volatility_weight: 0.6,
            scoring_weight: 0.4,
            projection_norm: 25.0,
            swing_multiplier: 1.5,
            high_volatility_cv: 0.6,
        }
    }
}

/// Snapshot-cache tuning for the data-fetch layer. The engine itself never
/// reads these; cache freshness is the caller's responsibility.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings { ttl_secs: 300 }
    }
}

// ---------------------------------------------------------------------------
// Assembled config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub engine: EngineSettings,
    pub cache: CacheSettings,
}

/// Load and validate league.toml.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;

    let config = Config {
        league: file.league,
        engine: file.engine,
        cache: file.cache,
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.num_teams < 2 {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".into(),
            message: format!("need at least 2 teams, got {}", config.league.num_teams),
        });
    }

    let engine = &config.engine;
    if engine.volatility_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "engine.volatility_window".into(),
            message: "window must be at least 1 game".into(),
        });
    }
    let weight_sum = engine.volatility_weight + engine.scoring_weight;
    if (weight_sum - 1.0).abs() > 1e-9 {
        return Err(ConfigError::ValidationError {
            field: "engine.volatility_weight".into(),
            message: format!("confidence weights must sum to 1.0, got {weight_sum}"),
        });
    }
    if engine.projection_norm <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "engine.projection_norm".into(),
            message: "projection_norm must be positive".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
