//! Transaction-level co-simulation CLI.
//!
//! This binary runs the two-processor producer/consumer demo. It performs:
//! 1. **Configuration:** Loads a JSON config (or uses defaults) and validates it.
//! 2. **Run:** Builds the system in synchronous or decoupled mode and runs it for a bounded
//!    simulated duration.
//! 3. **Report:** Prints statistics as text tables or as JSON.

use std::process;

use clap::builder::PossibleValuesParser;
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use tlmsim_core::SimTime;
use tlmsim_core::common::SimError;
use tlmsim_core::config::Config;
use tlmsim_core::demo::{self, DemoMode, DemoReport};
use tlmsim_core::stats::STATS_SECTIONS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Every instruction and transaction waits on the scheduler.
    Sync,
    /// Initiators run ahead by up to the global quantum.
    Decoupled,
}

impl From<ModeArg> for DemoMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sync => Self::Synchronous,
            ModeArg::Decoupled => Self::Decoupled,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "tlmsim",
    author,
    version,
    about = "Transaction-level memory-system co-simulation",
    long_about = "Run the producer/consumer demo: cpu0 writes words through the bus, cpu1 reads them back.\n\nExamples:\n  tlmsim --mode sync --duration-ns 100\n  tlmsim --mode decoupled --config system.json --json"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<String>,

    /// Timing mode of the two initiators.
    #[arg(short, long, value_enum, default_value_t = ModeArg::Decoupled)]
    mode: ModeArg,

    /// Simulated time to run, in nanoseconds.
    #[arg(short, long, default_value_t = 100, allow_negative_numbers = true)]
    duration_ns: i64,

    /// Log filter (e.g. `info`, `tlmsim_core=debug`); overrides `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,

    /// Print the report as JSON instead of text tables.
    #[arg(long)]
    json: bool,

    /// Statistics section to print (repeatable); all sections when omitted.
    #[arg(long = "stats", value_parser = PossibleValuesParser::new(STATS_SECTIONS.iter().copied()))]
    stats: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    if let Err(e) = run(&cli) {
        error!(error = %e, "simulation failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Installs the `tracing` subscriber; `--log-level` wins over `RUST_LOG`.
fn init_logging(level: Option<&str>) {
    let filter = level
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration, runs the demo and prints the report.
fn run(cli: &Cli) -> Result<(), SimError> {
    let duration = duration_from_ns(cli.duration_ns)?;
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let report = demo::run(&config, cli.mode.into(), duration)?;

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => error!(error = %e, "failed to serialize report"),
        }
    } else {
        print_report(&report, &cli.stats);
    }
    Ok(())
}

/// Converts the signed CLI duration, rejecting zero and negative values before any run.
fn duration_from_ns(ns: i64) -> Result<SimTime, SimError> {
    match u64::try_from(ns) {
        Ok(0) => Err(SimError::ZeroDuration),
        Ok(ns) => Ok(SimTime::from_ns(ns)),
        Err(_) => Err(SimError::NegativeDuration(ns)),
    }
}

fn print_report(report: &DemoReport, sections: &[String]) {
    println!("\n##################################################");
    println!("#  Producer/consumer demo ({}) complete", report.mode);
    println!("#  Simulated time   : {}", report.summary.end);
    println!("#  Resumptions      : {}", report.summary.resumptions);
    println!("#  Delta cycles     : {}", report.summary.delta_cycles);
    println!("##################################################");
    report.stats.print_sections(sections, report.summary.end);
    println!("MEMORY");
    for (address, word) in &report.memory {
        println!("  {address:#06x}: {word:#010x}");
    }
}
