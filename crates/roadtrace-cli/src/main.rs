//! roadtrace: extract per-road polylines from a JSON map file.
//!
//! Loads a map description, builds its topology, walks every road at the
//! configured sampling distance, and prints an extraction report. Optional
//! flags write the sampled waypoints and extracted roads as CSV, and the
//! two-panel plot data as JSON.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin roadtrace -- [OPTIONS] <MAP_JSON>
//! ```
//!
//! Logging goes to stderr. `-v` raises the level (`info`, `debug`,
//! `trace`); `RUST_LOG` takes precedence when set.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use roadtrace_topology::{Clock, ExtractConfig, Extractor, MapDescription, RoadNetwork};
use tracing_subscriber::EnvFilter;

/// Road polyline extraction from a map's topology.
///
/// Walks each topology edge forward from its origin until the road id
/// changes or the road ends, and reports what it found.
#[derive(Parser)]
#[command(name = "roadtrace", version)]
struct Cli {
    /// Path to the map description (JSON).
    map_path: PathBuf,

    /// Distance between successive waypoints of a walk (meters).
    #[arg(long, default_value_t = ExtractConfig::DEFAULT_SAMPLING_DISTANCE)]
    sampling_distance: f64,

    /// Maximum waypoints appended per road before the walk is cut short.
    #[arg(long, default_value_t = ExtractConfig::DEFAULT_MAX_STEPS_PER_ROAD, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_steps: usize,

    /// Disable the walk guard entirely.
    #[arg(long)]
    no_guard: bool,

    /// Full extraction config as a JSON string.
    ///
    /// When provided, all other extraction parameter flags are ignored.
    /// The JSON must be a valid `ExtractConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write every sampled map waypoint as CSV.
    #[arg(long)]
    waypoints_csv: Option<PathBuf>,

    /// Write the extracted roads as CSV.
    #[arg(long)]
    roads_csv: Option<PathBuf>,

    /// Write waypoint and topology plot series as JSON.
    #[arg(long)]
    plot_json: Option<PathBuf>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Build an [`ExtractConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<ExtractConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(ExtractConfig {
        sampling_distance: cli.sampling_distance,
        max_steps_per_road: (!cli.no_guard).then_some(cli.max_steps),
        ..ExtractConfig::default()
    })
}

/// Log filter for a `-v` count, unless `RUST_LOG` is set.
fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    })
}

fn load_map(path: &Path) -> Result<MapDescription, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn write_output(path: &Path, what: &str, contents: &str) -> Result<(), String> {
    std::fs::write(path, contents)
        .map_err(|e| format!("Error writing {what} to {}: {e}", path.display()))?;
    eprintln!(
        "{what} written to {} ({} bytes)",
        path.display(),
        contents.len()
    );
    Ok(())
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;
    let description = load_map(&cli.map_path)?;
    let network = RoadNetwork::from_description(&description)
        .map_err(|e| format!("Invalid map {}: {e}", cli.map_path.display()))?;
    let extractor =
        Extractor::new(&network, &config).map_err(|e| format!("Invalid config: {e}"))?;

    tracing::info!(
        map = network.name().unwrap_or("unnamed"),
        lanes = network.lane_count(),
        "loaded map"
    );
    eprintln!("Map: {} ({} lanes)", cli.map_path.display(), network.lane_count());
    eprintln!("Config: {config:#?}");
    eprintln!();

    let topology = network.topology();
    let (roads, diagnostics) = extractor.extract_with_diagnostics(&topology, &StdClock);

    if cli.json {
        let json = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", diagnostics.report());
    }

    let needs_waypoints = cli.waypoints_csv.is_some() || cli.plot_json.is_some();
    let waypoints = if needs_waypoints {
        network
            .generate_waypoints(extractor.sampling_distance())
            .map_err(|e| format!("Error sampling waypoints: {e}"))?
    } else {
        Vec::new()
    };

    if let Some(ref path) = cli.waypoints_csv {
        let csv = roadtrace_export::waypoints_csv(&network, &waypoints);
        write_output(path, "Waypoints CSV", &csv)?;
    }

    if let Some(ref path) = cli.roads_csv {
        let csv = roadtrace_export::roads_csv(&network, &roads);
        write_output(path, "Roads CSV", &csv)?;
    }

    if let Some(ref path) = cli.plot_json {
        let plot = roadtrace_export::plot_data(&network, network.name(), &waypoints, &roads);
        let json = roadtrace_export::plot::to_json(&plot)
            .map_err(|e| format!("Error serializing plot data: {e}"))?;
        write_output(path, "Plot JSON", &json)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
