//! Headless match runner.
//!
//! Plays one match and writes protocol lines to a writer. Matches with a
//! `stdin` corner run on the wall clock so a controller can react between
//! ticks; all other matches run as fast as possible.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use brawl_core::catalog::ActionCatalog;
use brawl_core::combatant::Slot;
use brawl_core::config::{CombatConfig, Ruleset};
use brawl_core::engine::CombatEngine;
use brawl_core::policy::FallbackPolicy;
use brawl_core::round::{BoxedSource, MatchController, StepReport};
use brawl_core::source::IdleSource;
use tokio::sync::mpsc;

use crate::error::{Result, RunnerError};
use crate::metrics::{MatchReport, OutcomeCounter};
use crate::protocol::{spawn_stdin_reader, ChannelSource, Response, CHANNEL_CAPACITY, PROTOCOL_VERSION};

/// Wall-clock poll interval for realtime matches.
const FRAME: Duration = Duration::from_millis(4);

/// What drives a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The built-in fallback policy.
    #[default]
    Policy,
    /// Never acts.
    Idle,
    /// Action requests read from stdin.
    Stdin,
}

/// Configuration for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Match seed.
    pub seed: u64,
    /// Action catalog RON file, embedded table when unset.
    pub catalog_path: Option<PathBuf>,
    /// Combat tuning RON file, embedded table when unset.
    pub config_path: Option<PathBuf>,
    /// Corner sources, slot one first.
    pub sources: [SourceKind; 2],
    /// Stop after this many ticks even if the match is undecided.
    pub max_ticks: Option<u64>,
}

/// Load the catalog and tuning, falling back to the embedded tables.
pub fn load_rules(catalog: Option<&Path>, combat: Option<&Path>) -> Result<Arc<Ruleset>> {
    let catalog = match catalog {
        Some(path) => {
            tracing::info!(?path, "Loading action catalog");
            ActionCatalog::from_ron_str(&fs::read_to_string(path)?)?
        }
        None => ActionCatalog::standard()?,
    };
    let combat = match combat {
        Some(path) => {
            tracing::info!(?path, "Loading combat config");
            CombatConfig::from_ron_str(&fs::read_to_string(path)?)?
        }
        None => CombatConfig::standard()?,
    };
    Ok(Ruleset { catalog, combat }.shared())
}

fn offline_source(kind: SourceKind, rules: &Arc<Ruleset>, seed: u64, slot: Slot) -> Result<BoxedSource> {
    match kind {
        SourceKind::Policy => Ok(Box::new(FallbackPolicy::new(Arc::clone(rules)).seeded(seed, slot))),
        SourceKind::Idle => Ok(Box::new(IdleSource)),
        SourceKind::Stdin => Err(RunnerError::InteractiveSource(
            "stdin sources need a realtime run",
        )),
    }
}

/// Play a match without any stdin corner.
///
/// Returns the report and the concatenated encoded outcome records, the
/// byte stream that determinism checks compare.
pub fn play_match(
    rules: &Arc<Ruleset>,
    seed: u64,
    sources: [SourceKind; 2],
) -> Result<(MatchReport, Vec<u8>)> {
    let one = offline_source(sources[0], rules, seed, Slot::One)?;
    let two = offline_source(sources[1], rules, seed, Slot::Two)?;
    let mut controller = MatchController::new(CombatEngine::new(Arc::clone(rules), seed), one, two);

    let mut counter = OutcomeCounter::default();
    let mut bytes = Vec::new();
    let mut encode_error = None;
    let result = controller.run_match(|outcome| {
        counter.record(outcome);
        match outcome.to_bytes() {
            Ok(encoded) => bytes.extend_from_slice(&encoded),
            Err(e) => encode_error = Some(e),
        }
    });
    if let Some(e) = encode_error {
        return Err(e.into());
    }

    let mut report = MatchReport::new(seed, source_names(&controller), result, controller.engine().state_hash());
    counter.apply(&mut report);
    Ok((report, bytes))
}

fn source_names(controller: &MatchController) -> [String; 2] {
    Slot::BOTH.map(|slot| controller.source_name(slot).to_string())
}

/// Runs one match and streams protocol lines.
pub struct MatchRunner {
    config: RunConfig,
}

impl MatchRunner {
    /// Create a runner.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Play the match, writing every protocol line to `out`.
    pub fn run<W: Write>(self, out: &mut W) -> Result<MatchReport> {
        let rules = load_rules(
            self.config.catalog_path.as_deref(),
            self.config.config_path.as_deref(),
        )?;

        let mut senders: [Option<mpsc::Sender<String>>; 2] = [None, None];
        let [one_sender, two_sender] = &mut senders;
        let seed = self.config.seed;
        let one = corner_source(self.config.sources[0], &rules, seed, Slot::One, one_sender)?;
        let two = corner_source(self.config.sources[1], &rules, seed, Slot::Two, two_sender)?;
        let realtime = senders.iter().any(Option::is_some);

        let mut controller =
            MatchController::new(CombatEngine::new(Arc::clone(&rules), self.config.seed), one, two);
        let names = source_names(&controller);
        tracing::info!(seed = self.config.seed, one = %names[0], two = %names[1], realtime, "Starting match");

        write_line(
            out,
            &Response::Ready {
                version: PROTOCOL_VERSION.to_string(),
                seed: self.config.seed,
                slot_one: names[0].clone(),
                slot_two: names[1].clone(),
            },
        )?;

        let mut counter = OutcomeCounter::default();
        let limit = self.config.max_ticks.unwrap_or(u64::MAX);
        let mut ticks = 0u64;
        if realtime {
            // Detached: the reader stays blocked on stdin until it closes.
            let _reader = spawn_stdin_reader(senders);
            let mut last = Instant::now();
            while !controller.is_finished() && ticks < limit {
                thread::sleep(FRAME);
                let now = Instant::now();
                let reports = controller.update(now - last);
                last = now;
                for report in &reports {
                    emit(out, report, &mut counter)?;
                }
                ticks += reports.len() as u64;
            }
        } else {
            while !controller.is_finished() && ticks < limit {
                let report = controller.step();
                emit(out, &report, &mut counter)?;
                ticks += 1;
            }
        }
        if !controller.is_finished() {
            tracing::warn!(ticks, "Tick limit reached before the match ended");
        }

        let mut report = MatchReport::new(
            self.config.seed,
            names,
            controller.result(),
            controller.engine().state_hash(),
        );
        counter.apply(&mut report);
        tracing::info!(winner = ?report.winner, wins = ?report.wins, ticks = report.ticks, "Match over");

        write_line(out, &Response::Summary(report.clone()))?;
        out.flush()?;
        Ok(report)
    }
}

fn corner_source(
    kind: SourceKind,
    rules: &Arc<Ruleset>,
    seed: u64,
    slot: Slot,
    sender: &mut Option<mpsc::Sender<String>>,
) -> Result<BoxedSource> {
    if kind == SourceKind::Stdin {
        let (tx, source) = ChannelSource::channel(CHANNEL_CAPACITY);
        *sender = Some(tx);
        return Ok(Box::new(source));
    }
    offline_source(kind, rules, seed, slot)
}

fn emit<W: Write>(out: &mut W, report: &StepReport, counter: &mut OutcomeCounter) -> Result<()> {
    if let Some(outcome) = &report.outcome {
        counter.record(outcome);
        write_line(out, &Response::Outcome(outcome.clone()))?;
    }
    if let Some(round) = report.round_over {
        write_line(out, &Response::RoundOver(round))?;
    }
    Ok(())
}

fn write_line<W: Write>(out: &mut W, response: &Response) -> Result<()> {
    writeln!(out, "{}", response.to_line()?)?;
    Ok(())
}
