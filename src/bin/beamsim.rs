//! Beamline transport runner
//!
//! Run the particle transport simulation and export every detector hit to CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin beamsim -- --particles 20 --seed 7 --output detected_particle.csv
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use beamsim::export::export_detections_csv;
use beamsim::{SimulationConfig, TransportEngine};

/// Monte Carlo particle transport through a three-detector beamline
#[derive(Parser, Debug)]
#[command(name = "beamsim")]
#[command(about = "Simulate charged particles crossing the detector bands and export the hits")]
struct Args {
    /// JSON config file; command-line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of particles in the pool
    #[arg(short, long)]
    particles: Option<usize>,

    /// Tick length in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Total simulated time in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(short, long, default_value = "detected_particle.csv")]
    output: PathBuf,

    /// Print the final state of every particle
    #[arg(long)]
    status: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn build_config(args: &Args) -> beamsim::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(n) = args.particles {
        config.num_particles = n;
    }
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    if let Some(d) = args.duration {
        config.duration = d;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> beamsim::Result<()> {
    let config = build_config(args)?;
    let mut engine = TransportEngine::new(config)?;
    engine.run();

    if args.status {
        for p in engine.particles() {
            println!("{p}");
        }
    }
    for (detector, hits) in engine.detections().counts_by_detector() {
        info!(detector, hits, "detector summary");
    }

    let outcome = engine.into_outcome();
    export_detections_csv(&args.output, &outcome.detections)?;
    info!(
        path = %args.output.display(),
        rows = outcome.detections.len(),
        decays = outcome.decays.len(),
        seed = outcome.seed,
        "data successfully saved"
    );
    Ok(())
}

fn main() {
    init_logging();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{e}");
        process::exit(1);
    }
}
