// Matchup assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr; stdout carries the JSON output)
// 2. Load league.toml if present
// 3. Load the exported snapshot JSON
// 4. Assemble the matchup view (and optionally the lineup optimization)
// 5. Print the result as JSON

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, warn};

use matchup_assistant::config::{load_config, Config, ConfigError, EngineSettings};
use matchup_assistant::engine::matchup::{assemble_matchup, optimize_roster};
use matchup_assistant::provider::{FileSource, SnapshotSource};

const USAGE: &str = "usage: gridcast [--config league.toml] [--optimize] <snapshot.json> <roster_id>";

struct Args {
    config_path: Option<PathBuf>,
    snapshot_path: PathBuf,
    roster_id: i64,
    optimize: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config_path = None;
    let mut optimize = false;
    let mut positional: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    bail!("--config requires a path\n{USAGE}");
                };
                config_path = Some(PathBuf::from(path));
            }
            "--optimize" => optimize = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => positional.push(arg),
        }
    }

    let [snapshot_path, roster_id] = positional.as_slice() else {
        bail!("{USAGE}");
    };
    let roster_id: i64 = roster_id
        .parse()
        .with_context(|| format!("roster_id must be an integer, got `{roster_id}`"))?;

    Ok(Args {
        config_path,
        snapshot_path: PathBuf::from(snapshot_path),
        roster_id,
        optimize,
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = parse_args()?;

    // league.toml is optional unless explicitly requested: the snapshot
    // carries the league data, the config only tunes the engine.
    let config: Option<Config> = match &args.config_path {
        Some(path) => Some(load_config(path).context("failed to load configuration")?),
        None => match load_config(std::path::Path::new("league.toml")) {
            Ok(config) => Some(config),
            Err(ConfigError::FileNotFound { .. }) => {
                info!("no league.toml found; using default engine settings");
                None
            }
            Err(e) => return Err(e).context("failed to load league.toml"),
        },
    };
    let settings: EngineSettings = config
        .as_ref()
        .map(|c| c.engine.clone())
        .unwrap_or_default();

    let mut source = FileSource::new(&args.snapshot_path);
    let mut snapshot = source
        .fetch("", 0)
        .context("failed to load snapshot")?;

    if let Some(config) = &config {
        info!(
            "Config loaded: league={}, {} teams, {} scoring",
            config.league.name, config.league.num_teams, config.league.scoring_type
        );
        // The snapshot's own settings win; config fills the gaps.
        if snapshot.settings.roster_positions.is_empty() {
            snapshot.settings.roster_positions = config.league.roster_positions.clone();
        }
        for (owner_id, name) in &config.league.owners {
            snapshot
                .owner_names
                .entry(owner_id.clone())
                .or_insert_with(|| name.clone());
        }

        if let Some(fetched_at) = snapshot.fetched_at {
            let age = chrono::Utc::now().signed_duration_since(fetched_at);
            if age > chrono::Duration::seconds(config.cache.ttl_secs as i64) {
                warn!(
                    "snapshot is {}s old (cache TTL {}s); projections may be stale",
                    age.num_seconds(),
                    config.cache.ttl_secs
                );
            }
        }
    }

    let view = assemble_matchup(&snapshot, &settings, args.roster_id)
        .context("failed to assemble matchup")?;

    let output = if args.optimize {
        let optimization = optimize_roster(&snapshot, &settings, args.roster_id)
            .context("failed to optimize lineup")?;
        let mut combined = HashMap::new();
        combined.insert("matchup", serde_json::to_value(&view)?);
        combined.insert("optimization", serde_json::to_value(&optimization)?);
        serde_json::to_string_pretty(&combined)?
    } else {
        serde_json::to_string_pretty(&view)?
    };

    println!("{output}");
    Ok(())
}

/// Initialize tracing to stderr so stdout stays a clean JSON stream.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchup_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
