//! Headless fight runner.
//!
//! Runs matches without graphics. Corners are driven by the fallback
//! policy, left idle, or controlled via JSON on stdin.
//!
//! # Usage
//!
//! ```bash
//! # Single match, policy against policy
//! cargo run -p brawl_headless -- run --seed 42
//!
//! # Batch of seeds for balance testing
//! cargo run -p brawl_headless -- batch --count 1000 --output results/
//!
//! # Print the embedded action catalog
//! cargo run -p brawl_headless -- catalog
//! ```
//!
//! # Protocol
//!
//! Input (stdin): action requests, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brawl_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{load_rules, MatchRunner, RunConfig, SourceKind},
    RunnerError,
};

#[derive(Parser)]
#[command(name = "brawl_headless")]
#[command(about = "Headless fight runner for policy testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Action catalog RON file (embedded table when omitted)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Combat tuning RON file (embedded table when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match, streaming JSON lines
    Run {
        /// Match seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Source driving corner one
        #[arg(long, value_enum, default_value = "policy")]
        slot_one: SourceKind,

        /// Source driving corner two
        #[arg(long, value_enum, default_value = "policy")]
        slot_two: SourceKind,

        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Run batch of matches for balance testing
    Batch {
        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Seed of the first match
        #[arg(long, default_value = "0")]
        seed_start: u64,

        /// Source driving corner one
        #[arg(long, value_enum, default_value = "policy")]
        slot_one: SourceKind,

        /// Source driving corner two
        #[arg(long, value_enum, default_value = "policy")]
        slot_two: SourceKind,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Print the loaded action catalog as RON
    Catalog,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            seed,
            slot_one,
            slot_two,
            max_ticks,
        }) => cmd_run(RunConfig {
            seed,
            catalog_path: cli.catalog,
            config_path: cli.config,
            sources: [slot_one, slot_two],
            max_ticks,
        }),
        Some(Commands::Batch {
            count,
            parallel,
            output,
            seed_start,
            slot_one,
            slot_two,
        }) => {
            let config = BatchConfig {
                match_count: count,
                seed_start,
                parallel,
                output_dir: output,
                sources: [slot_one, slot_two],
            };
            cmd_batch(cli.catalog, cli.config, config)
        }
        Some(Commands::Verify { seed, runs }) => cmd_verify(cli.catalog, cli.config, seed, runs),
        Some(Commands::Catalog) => cmd_catalog(cli.catalog, cli.config),
        None => cmd_run(RunConfig {
            catalog_path: cli.catalog,
            config_path: cli.config,
            ..RunConfig::default()
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Run a single match to stdout
fn cmd_run(config: RunConfig) -> Result<ExitCode, RunnerError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    MatchRunner::new(config).run(&mut out)?;
    Ok(ExitCode::SUCCESS)
}

/// Run batch of matches for balance testing
fn cmd_batch(
    catalog: Option<PathBuf>,
    combat: Option<PathBuf>,
    config: BatchConfig,
) -> Result<ExitCode, RunnerError> {
    let rules = load_rules(catalog.as_deref(), combat.as_deref())?;
    let output = config.output_dir.join("batch_results.json");
    let results = run_batch(&rules, config);
    results.save(&output)?;

    let summary = &results.summary;
    println!("\n=== Batch Results ===");
    println!("Matches: {}", summary.matches);
    println!(
        "Slot one: {} wins ({:.1}%)",
        summary.wins[0], summary.win_rate_pct[0]
    );
    println!(
        "Slot two: {} wins ({:.1}%)",
        summary.wins[1], summary.win_rate_pct[1]
    );
    println!("Draws: {}", summary.draws);
    println!(
        "Rounds: {} KO, {} decision, {} drawn",
        summary.knockouts, summary.decisions, summary.drawn_rounds
    );
    println!("Average match length: {:.0} ticks", summary.avg_ticks);
    if !results.errors.is_empty() {
        println!("Errors: {}", results.errors.len());
    }
    println!("Results saved to {}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// Verify determinism
fn cmd_verify(
    catalog: Option<PathBuf>,
    combat: Option<PathBuf>,
    seed: u64,
    runs: u32,
) -> Result<ExitCode, RunnerError> {
    let rules = load_rules(catalog.as_deref(), combat.as_deref())?;
    tracing::info!("Verifying determinism: seed {}, {} runs", seed, runs);

    let report = verify_determinism(&rules, seed, runs, [SourceKind::Policy; 2])?;
    if report.identical {
        println!("PASS: {} runs produced identical outcomes", report.runs);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAIL: runs diverged, hashes {:?}", report.hashes);
        Ok(ExitCode::FAILURE)
    }
}

/// Print the action catalog
fn cmd_catalog(catalog: Option<PathBuf>, combat: Option<PathBuf>) -> Result<ExitCode, RunnerError> {
    let rules = load_rules(catalog.as_deref(), combat.as_deref())?;
    println!("{}", rules.catalog.to_ron_string()?);
    Ok(ExitCode::SUCCESS)
}
