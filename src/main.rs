use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use autoinvest::analysis::{self, Summary};
use autoinvest::config::{AllocationRatios, SimulationConfig};
use autoinvest::credit::{self, CreditRecord};
use autoinvest::montecarlo::MonteCarlo;
use autoinvest::simulation::Simulation;

/// Monte Carlo simulation of an auto-invest peer-lending portfolio.
#[derive(Parser, Debug)]
#[command(name = "autoinvest", version)]
struct Args {
    /// JSON credit list as returned by the portfolio API
    #[arg(value_name = "CREDITS_JSON")]
    credits: PathBuf,

    /// Number of Monte Carlo simulations to run
    #[arg(long, default_value_t = 1000)]
    iterations: usize,

    /// Seed for the random number generator, to recreate a study
    #[arg(long)]
    random_seed: Option<u64>,

    /// Amount initially put into the portfolio
    #[arg(long, default_value_t = 10_000.0)]
    initial_amount: f64,

    /// Number of days to simulate
    #[arg(long, value_name = "DAYS", alias = "time-horison", default_value_t = 365)]
    time_horizon: u64,

    /// JSON allocation-ratio table; defaults to the built-in settings
    #[arg(long, value_name = "FILE")]
    ratios: Option<PathBuf>,

    /// Spread iterations across all cores (iteration i seeded with seed + i)
    #[arg(long)]
    parallel: bool,

    /// Write the event log of the first iteration as NDJSON
    #[arg(long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// Log more (-v loans, -vv per-run details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file = File::open(&args.credits)
        .with_context(|| format!("cannot open {}", args.credits.display()))?;
    let raw = credit::load_credits(BufReader::new(file))
        .with_context(|| format!("cannot parse {}", args.credits.display()))?;
    let credits = credit::decorate(&raw)?;

    let ratios = match &args.ratios {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            AllocationRatios::from_json(BufReader::new(file))
                .with_context(|| format!("cannot load ratios from {}", path.display()))?
        }
        None => AllocationRatios::canonical(),
    };

    let config = SimulationConfig {
        seed: args.random_seed,
        iterations: args.iterations,
        initial_amount: args.initial_amount,
        horizon_days: args.time_horizon,
    };
    let study = MonteCarlo::new(&credits, &ratios, &config)?;
    info!("{} credits, {} iterations, seed {}", credits.len(), config.iterations, study.seed());

    if let Some(path) = &args.events {
        write_event_log(path, &credits, &ratios, &config, study.seed())?;
    }

    let outcomes = if args.parallel { study.run_parallel()? } else { study.run()? };
    let terminal: Vec<f64> = outcomes.iter().map(|o| o.terminal_value).collect();
    debug!("simulation outcomes before normalisation: {terminal:?}");

    let growth = analysis::annualized_growth(&outcomes, config.initial_amount, config.horizon_days);
    debug!("simulation outcomes after normalisation: {growth:?}");

    let summary = analysis::summarize(&growth, config.initial_amount).context("no simulation outcomes")?;
    print_summary(&summary);
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Replays the first iteration and writes every resumed wake-up as one JSON line.
fn write_event_log(
    path: &Path,
    credits: &[CreditRecord],
    ratios: &AllocationRatios,
    config: &SimulationConfig,
    seed: u64,
) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut sim =
        Simulation::new(credits, ratios, config.initial_amount, config.horizon_days, &mut rng)?.with_log();
    sim.start()?;
    sim.run()?;

    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for ev in &sim.log {
        serde_json::to_writer(&mut writer, ev)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    info!("{} events → {}", sim.log.len(), path.display());
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("Initial amount:        {:.2} SEK", summary.initial_amount);
    println!("Number of simulations: {}", summary.n);
    println!();
    println!("Summary of marginal gains (positive is profit, negative is loss):");

    let row = |label: &str, growth: f64| {
        println!(
            "{label:>20}: {:>6.2}% ({:.2} SEK)",
            Summary::gain(growth) * 100.0,
            summary.amount(growth)
        );
    };
    row("Average", summary.mean);
    for p in &summary.percentiles {
        row(&format!("{}th percentile", p.percentile), p.growth);
    }

    println!();
    println!("(all percentages are yearly)");
}
