use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use gps_odometer::track::{replay_track, TrackLog};
use gps_odometer::OdometerConfig;
use serde_json::json;

#[derive(Parser, Debug)]
struct Args {
    /// Path to a track_*.json[.gz] log
    #[arg(long, conflicts_with = "golden_dir")]
    log: Option<PathBuf>,

    /// Directory of golden tracks to batch replay (processes track_*.json[.gz])
    #[arg(long)]
    golden_dir: Option<PathBuf>,

    /// Odometer config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the minimum ground speed (knots)
    #[arg(long)]
    min_speed: Option<f64>,

    /// Override the speed-difference tolerance (knots)
    #[arg(long)]
    max_speed_diff: Option<f64>,

    /// Override the sample period (seconds)
    #[arg(long)]
    sample_period: Option<f64>,
}

fn build_config(args: &Args) -> anyhow::Result<OdometerConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => OdometerConfig::load(path)?,
        None => OdometerConfig::default(),
    };
    if let Some(v) = args.min_speed {
        config.min_speed_knots = v;
    }
    if let Some(v) = args.max_speed_diff {
        config.max_speed_diff_knots = v;
    }
    if let Some(v) = args.sample_period {
        config.sample_period_s = v;
    }
    config.validate()?;
    Ok(config)
}

fn run_once(path: &Path, config: &OdometerConfig) -> anyhow::Result<serde_json::Value> {
    let log = TrackLog::load(path)?;
    let summary = replay_track(&log, config.clone());

    Ok(json!({
        "log": path.display().to_string(),
        "replayed_at": Utc::now().to_rfc3339(),
        "config": config,
        "summary": summary,
    }))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;
    let mut results = Vec::new();

    if let Some(dir) = args.golden_dir.as_ref() {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !(name.starts_with("track_") && (name.ends_with(".json") || name.ends_with(".json.gz"))) {
                continue;
            }
            match run_once(&path, &config) {
                Ok(res) => results.push(res),
                Err(e) => log::error!("Failed {}: {}", path.display(), e),
            }
        }
    } else if let Some(log) = args.log.as_ref() {
        results.push(run_once(log, &config)?);
    } else {
        anyhow::bail!("Provide --log or --golden-dir");
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
