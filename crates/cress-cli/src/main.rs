//! Command line interface for crop residue emission estimation.
//!
//! Loads a scenario file, runs the residue, emission factor and emission
//! aggregators in sequence and prints a JSON report.
//!
//! Farmer mode evaluates the baseline scenario once. Scientific mode first
//! expands single-valued parameters into sample arrays, then sweeps each
//! one while the rest stay at baseline.

mod config;
mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cress_core::mode::Mode;
use cress_sweep::{EmissionAggregator, EmissionFactorAggregator, ResidueAggregator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use crate::config::Scenario;
use crate::report::Report;

#[derive(Parser)]
#[command(name = "cress")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Estimate direct N2O emissions from crop residue decomposition")]
struct Args {
    /// Scenario file (TOML) with the five parameter groups
    #[arg(long, value_name = "FILE")]
    scenario: PathBuf,

    /// Execution mode: farmer evaluates the baseline once, scientific
    /// sweeps every multi-valued parameter one at a time
    #[arg(long, default_value_t = Mode::Farmer)]
    mode: Mode,

    /// Seed for reproducible sampling draws in scientific mode
    #[arg(long)]
    seed: Option<u64>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let Scenario {
        mut parameters,
        sampling,
    } = config::load_scenario(&args.scenario)?;
    log::info!(
        "Analysing scenario {} in {} mode",
        args.scenario.display(),
        args.mode
    );

    if args.mode == Mode::Scientific {
        match args.seed {
            Some(seed) => {
                log::debug!("Expanding samples with seed {seed}");
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                sampling.expand(&mut parameters, &mut rng)?;
            }
            None => {
                let mut rng = rand::thread_rng();
                sampling.expand(&mut parameters, &mut rng)?;
            }
        }
    }

    let residue = ResidueAggregator::new(&parameters, args.mode)?;
    let factors = EmissionFactorAggregator::new(&parameters, args.mode)?;
    log::debug!(
        "Resolved modes: residue {}, emission factor {}",
        residue.mode(),
        factors.mode()
    );

    let residue_result = residue.analyze()?;
    let factor_result = factors.analyze()?;

    let emissions = EmissionAggregator::new(&factor_result, &residue_result, args.mode)?;
    let emission_result = emissions.analyze()?;

    let report = Report {
        input_parameters: parameters,
        crop_nitrogen_residue: residue_result,
        emission_factors: factor_result,
        total_direct_nitrogen_emission: emission_result,
    };
    let json = report.to_json().context("Failed to serialise the report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
