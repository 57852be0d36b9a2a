#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Touchline simulations headlessly.

mod modes;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use touchline_core::{tuning::Tuning, WELCOME_BANNER};
use touchline_store::{JsonFileStore, KeyValueStore, MemoryStore};
use tracing_subscriber::EnvFilter;

/// Runs the penalty shootout, city builder or farm without a screen.
#[derive(Debug, Parser)]
#[command(name = "touchline", version, about)]
struct Cli {
    /// Seed for every random source in the session.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// TOML file overriding tuning values.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,
    /// JSON file persisting the difficulty rotation and saved layouts.
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Plays a five-round shootout with a fixed drag for every player shot.
    Shootout(ShootoutArgs),
    /// Runs city traffic on the saved layout or a demo road loop.
    City(GridArgs),
    /// Runs the farm timers on the saved plots or a demo field.
    Farm(GridArgs),
}

/// Options for the shootout mode.
#[derive(Debug, Args)]
struct ShootoutArgs {
    /// Horizontal drag component; positive aims right.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    drag_x: f32,
    /// Upward drag length; at most 50 cancels the shot.
    #[arg(long, default_value_t = 300.0)]
    drag_y: f32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

/// Options shared by the grid modes.
#[derive(Debug, Args)]
struct GridArgs {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 120)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let tuning = load_tuning(cli.tuning.as_ref())?;

    let mut store: Box<dyn KeyValueStore> = match &cli.store {
        Some(path) => Box::new(
            JsonFileStore::open(path)
                .with_context(|| format!("failed to open store {}", path.display()))?,
        ),
        None => Box::new(MemoryStore::new()),
    };

    println!("{WELCOME_BANNER}");
    match cli.mode {
        Mode::Shootout(args) => modes::shootout(&mut *store, tuning.shootout, cli.seed, &args),
        Mode::City(args) => modes::city(&mut *store, tuning.city, cli.seed, &args),
        Mode::Farm(args) => modes::farm(&mut *store, tuning.farm, cli.seed, &args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse tuning file {}", path.display()))
}
