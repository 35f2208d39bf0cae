//! Rounds and matches.
//!
//! [`MatchController`] drives a [`CombatEngine`] with two
//! [`ActionSource`]s. Each tick it asks every ready source for a choice,
//! submits it, and steps the engine. A round ends on a knockout or when
//! its time runs out; the match is best of [`RoundConfig::rounds`].
//!
//! [`RoundConfig::rounds`]: crate::config::RoundConfig::rounds

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::MatchClock;
use crate::combatant::Slot;
use crate::engine::CombatEngine;
use crate::outcome::TickOutcome;
use crate::rng::{CombatRng, SeededRng};
use crate::source::ActionSource;
use crate::stats::CombatStats;

/// A boxed decision source.
pub type BoxedSource = Box<dyn ActionSource + Send>;

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEnding {
    /// A combatant's health reached zero.
    KnockOut,
    /// Time ran out with one side ahead on health.
    Decision,
    /// Time ran out level.
    Draw,
}

/// One finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Round number, from 1.
    pub round: u32,
    /// Winner, `None` on a draw.
    pub winner: Option<Slot>,
    /// How it ended.
    pub ending: RoundEnding,
    /// Ticks the round lasted.
    pub ticks: u64,
    /// Health at the bell, slot one first.
    pub health: [u32; 2],
}

/// A finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Winner, `None` when rounds were level.
    pub winner: Option<Slot>,
    /// Rounds won, slot one first.
    pub wins: [u32; 2],
    /// Every round played.
    pub rounds: Vec<RoundResult>,
    /// Cumulative statistics, slot one first.
    pub stats: [CombatStats; 2],
    /// Total ticks simulated.
    pub ticks: u64,
}

/// What one controller step produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Outcome record, when a strike landed.
    pub outcome: Option<TickOutcome>,
    /// Set on the tick a round ended.
    pub round_over: Option<RoundResult>,
}

/// Rounds, sources and the engine between them.
pub struct MatchController<R = SeededRng> {
    engine: CombatEngine<R>,
    sources: [BoxedSource; 2],
    cooldowns: [u32; 2],
    round: u32,
    round_tick: u64,
    total_ticks: u64,
    wins: [u32; 2],
    rounds: Vec<RoundResult>,
    clock: MatchClock,
    finished: bool,
}

impl<R: CombatRng> MatchController<R> {
    /// Controller over a fresh match.
    pub fn new(engine: CombatEngine<R>, one: BoxedSource, two: BoxedSource) -> Self {
        let clock = MatchClock::new(engine.rules().combat.round.max_catch_up_ticks);
        let mut controller = Self {
            engine,
            sources: [one, two],
            cooldowns: [0; 2],
            round: 1,
            round_tick: 0,
            total_ticks: 0,
            wins: [0; 2],
            rounds: Vec::new(),
            clock,
            finished: false,
        };
        controller.reset_match();
        controller
    }

    /// The engine.
    #[must_use]
    pub const fn engine(&self) -> &CombatEngine<R> {
        &self.engine
    }

    /// Current round number, from 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Ticks left in the current round.
    #[must_use]
    pub fn time_remaining(&self) -> u64 {
        self.engine
            .rules()
            .combat
            .round
            .round_ticks
            .saturating_sub(self.round_tick)
    }

    /// Rounds won so far, slot one first.
    #[must_use]
    pub const fn wins(&self) -> [u32; 2] {
        self.wins
    }

    /// No more rounds will be played.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Name of the source driving `slot`.
    #[must_use]
    pub fn source_name(&self, slot: Slot) -> &str {
        self.sources[slot.index()].name()
    }

    /// Start over from round one.
    pub fn reset_match(&mut self) {
        self.engine.reset_match();
        for source in &mut self.sources {
            source.reset();
        }
        self.cooldowns = [0; 2];
        self.round = 1;
        self.round_tick = 0;
        self.total_ticks = 0;
        self.wins = [0; 2];
        self.rounds.clear();
        self.clock.reset();
        self.finished = false;
    }

    /// Run one tick.
    pub fn step(&mut self) -> StepReport {
        if self.finished {
            return StepReport::default();
        }

        // 1. Decisions, from views taken before either submission
        let views = [
            self.engine.combatant(Slot::One).view(),
            self.engine.combatant(Slot::Two).view(),
        ];
        let time_remaining = self.time_remaining();
        let interval = self.engine.rules().combat.round.decision_interval;
        let mut choices = [None; 2];
        for slot in Slot::BOTH {
            let i = slot.index();
            if self.cooldowns[i] > 0 {
                self.cooldowns[i] -= 1;
                continue;
            }
            if !views[i].can_act {
                continue;
            }
            choices[i] =
                self.sources[i].choose_action(&views[i], &views[slot.other().index()], time_remaining);
            self.cooldowns[i] = interval.saturating_sub(1);
        }
        for slot in Slot::BOTH {
            self.engine.submit(slot, choices[slot.index()]);
        }

        // 2. Simulation
        let outcome = self.engine.step();
        self.round_tick += 1;
        self.total_ticks += 1;

        // 3. Bell
        let round_over = self.check_round_end();
        StepReport {
            outcome,
            round_over,
        }
    }

    /// Run until the current round ends, passing each outcome to `sink`.
    pub fn run_round(&mut self, mut sink: impl FnMut(&TickOutcome)) -> Option<RoundResult> {
        while !self.finished {
            let report = self.step();
            if let Some(outcome) = &report.outcome {
                sink(outcome);
            }
            if report.round_over.is_some() {
                return report.round_over;
            }
        }
        None
    }

    /// Play a whole match from the start.
    pub fn run_match(&mut self, mut sink: impl FnMut(&TickOutcome)) -> MatchResult {
        self.reset_match();
        while self.run_round(&mut sink).is_some() {}
        self.result()
    }

    /// Advance by wall-clock time. Returns reports for the ticks run.
    pub fn update(&mut self, dt: Duration) -> Vec<StepReport> {
        let ticks = self.clock.advance(dt);
        let mut reports = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            if self.finished {
                break;
            }
            reports.push(self.step());
        }
        reports
    }

    /// Match summary so far.
    #[must_use]
    pub fn result(&self) -> MatchResult {
        let winner = match self.wins[0].cmp(&self.wins[1]) {
            std::cmp::Ordering::Greater => Some(Slot::One),
            std::cmp::Ordering::Less => Some(Slot::Two),
            std::cmp::Ordering::Equal => None,
        };
        MatchResult {
            winner,
            wins: self.wins,
            rounds: self.rounds.clone(),
            stats: [
                *self.engine.combatant(Slot::One).stats(),
                *self.engine.combatant(Slot::Two).stats(),
            ],
            ticks: self.total_ticks,
        }
    }

    fn check_round_end(&mut self) -> Option<RoundResult> {
        let one = self.engine.combatant(Slot::One);
        let two = self.engine.combatant(Slot::Two);
        let health = [one.resources().health(), two.resources().health()];

        let (winner, ending) = match (one.is_knocked_out(), two.is_knocked_out()) {
            (true, true) => (None, RoundEnding::Draw),
            (false, true) => (Some(Slot::One), RoundEnding::KnockOut),
            (true, false) => (Some(Slot::Two), RoundEnding::KnockOut),
            (false, false) if self.time_remaining() == 0 => match health[0].cmp(&health[1]) {
                std::cmp::Ordering::Greater => (Some(Slot::One), RoundEnding::Decision),
                std::cmp::Ordering::Less => (Some(Slot::Two), RoundEnding::Decision),
                std::cmp::Ordering::Equal => (None, RoundEnding::Draw),
            },
            (false, false) => return None,
        };

        let result = RoundResult {
            round: self.round,
            winner,
            ending,
            ticks: self.round_tick,
            health,
        };
        if let Some(slot) = winner {
            self.wins[slot.index()] += 1;
        }
        self.rounds.push(result);
        tracing::info!(
            round = self.round,
            winner = ?winner,
            ending = ?ending,
            ticks = self.round_tick,
            "Round over"
        );

        let rounds = self.engine.rules().combat.round.rounds;
        let needed = rounds / 2 + 1;
        if self.wins.iter().any(|&w| w >= needed) || self.round >= rounds {
            self.finished = true;
        } else {
            self.round += 1;
            self.round_tick = 0;
            self.cooldowns = [0; 2];
            self.engine.reset_round();
            for source in &mut self.sources {
                source.reset();
            }
        }
        Some(result)
    }
}

impl<R> std::fmt::Debug for MatchController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchController")
            .field("round", &self.round)
            .field("round_tick", &self.round_tick)
            .field("wins", &self.wins)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
