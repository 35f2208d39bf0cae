//! Match metrics for balance analysis.

use serde::{Deserialize, Serialize};

use brawl_core::combatant::Slot;
use brawl_core::outcome::TickOutcome;
use brawl_core::round::{MatchResult, RoundEnding, RoundResult};
use brawl_core::stats::CombatStats;

/// Everything recorded about one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Seed the match ran with.
    pub seed: u64,
    /// Source names, slot one first.
    pub sources: [String; 2],
    /// Winner, `None` for a draw.
    pub winner: Option<Slot>,
    /// Rounds won, slot one first.
    pub wins: [u32; 2],
    /// Every round played.
    pub rounds: Vec<RoundResult>,
    /// Cumulative statistics, slot one first.
    pub stats: [CombatStats; 2],
    /// Ticks simulated.
    pub ticks: u64,
    /// Ticks that produced an outcome record.
    pub outcome_ticks: u64,
    /// Ticks where both sides connected.
    pub trades: u64,
    /// Knockdowns scored.
    pub knockdowns: u64,
    /// Final engine state hash.
    pub final_state_hash: u64,
}

impl MatchReport {
    /// Report with totals from `result`. Outcome counters start at zero.
    #[must_use]
    pub fn new(seed: u64, sources: [String; 2], result: MatchResult, final_state_hash: u64) -> Self {
        Self {
            seed,
            sources,
            winner: result.winner,
            wins: result.wins,
            rounds: result.rounds,
            stats: result.stats,
            ticks: result.ticks,
            outcome_ticks: 0,
            trades: 0,
            knockdowns: 0,
            final_state_hash,
        }
    }
}

/// Running outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounter {
    /// Ticks with a record.
    pub outcome_ticks: u64,
    /// Trades.
    pub trades: u64,
    /// Knockdowns.
    pub knockdowns: u64,
}

impl OutcomeCounter {
    /// Count one record.
    pub fn record(&mut self, outcome: &TickOutcome) {
        self.outcome_ticks += 1;
        if outcome.trade {
            self.trades += 1;
        }
        self.knockdowns += outcome.entries.iter().filter(|e| e.knockdown).count() as u64;
    }

    /// Copy the counters into `report`.
    pub fn apply(&self, report: &mut MatchReport) {
        report.outcome_ticks = self.outcome_ticks;
        report.trades = self.trades;
        report.knockdowns = self.knockdowns;
    }
}

/// Aggregate over many matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches summarized.
    pub matches: u32,
    /// Match wins, slot one first.
    pub wins: [u32; 2],
    /// Drawn matches.
    pub draws: u32,
    /// Match win rate, percent, slot one first.
    pub win_rate_pct: [f64; 2],
    /// Rounds ended by knockout.
    pub knockouts: u32,
    /// Rounds decided on health.
    pub decisions: u32,
    /// Rounds drawn.
    pub drawn_rounds: u32,
    /// Mean match length in ticks.
    pub avg_ticks: f64,
    /// Mean damage dealt per match, slot one first.
    pub avg_damage_dealt: [f64; 2],
    /// Mean trades per match.
    pub avg_trades: f64,
    /// Longest combo seen.
    pub max_combo: u32,
}

impl BatchSummary {
    /// Summarize a set of match reports.
    #[must_use]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        let mut summary = Self {
            matches: u32::try_from(reports.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };
        if reports.is_empty() {
            return summary;
        }

        let mut ticks = 0u64;
        let mut damage = [0u64; 2];
        let mut trades = 0u64;
        for report in reports {
            match report.winner {
                Some(slot) => summary.wins[slot.index()] += 1,
                None => summary.draws += 1,
            }
            for round in &report.rounds {
                match round.ending {
                    RoundEnding::KnockOut => summary.knockouts += 1,
                    RoundEnding::Decision => summary.decisions += 1,
                    RoundEnding::Draw => summary.drawn_rounds += 1,
                }
            }
            ticks += report.ticks;
            trades += report.trades;
            for slot in Slot::BOTH {
                let stats = &report.stats[slot.index()];
                damage[slot.index()] += u64::from(stats.damage_dealt);
                summary.max_combo = summary.max_combo.max(stats.max_combo);
            }
        }

        let n = reports.len() as f64;
        for slot in Slot::BOTH {
            let i = slot.index();
            summary.win_rate_pct[i] = f64::from(summary.wins[i]) / n * 100.0;
            summary.avg_damage_dealt[i] = damage[i] as f64 / n;
        }
        summary.avg_ticks = ticks as f64 / n;
        summary.avg_trades = trades as f64 / n;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(winner: Option<Slot>, ending: RoundEnding, ticks: u64) -> MatchReport {
        let round = RoundResult {
            round: 1,
            winner,
            ending,
            ticks,
            health: [50, 0],
        };
        let mut stats = [CombatStats::default(); 2];
        stats[0].damage_dealt = 100;
        stats[0].max_combo = 4;
        MatchReport::new(
            1,
            ["fallback".into(), "fallback".into()],
            MatchResult {
                winner,
                wins: [1, 0],
                rounds: vec![round],
                stats,
                ticks,
            },
            0,
        )
    }

    #[test]
    fn test_summary_rates() {
        let reports = vec![
            report(Some(Slot::One), RoundEnding::KnockOut, 600),
            report(Some(Slot::One), RoundEnding::Decision, 1_000),
            report(None, RoundEnding::Draw, 1_400),
            report(Some(Slot::Two), RoundEnding::KnockOut, 1_000),
        ];
        let summary = BatchSummary::from_reports(&reports);
        assert_eq!(summary.matches, 4);
        assert_eq!(summary.wins, [2, 1]);
        assert_eq!(summary.draws, 1);
        assert!((summary.win_rate_pct[0] - 50.0).abs() < 1e-9);
        assert_eq!(summary.knockouts, 2);
        assert_eq!(summary.decisions, 1);
        assert!((summary.avg_ticks - 1_000.0).abs() < 1e-9);
        assert!((summary.avg_damage_dealt[0] - 100.0).abs() < 1e-9);
        assert_eq!(summary.max_combo, 4);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_reports(&[]);
        assert_eq!(summary.matches, 0);
        assert_eq!(summary.avg_ticks, 0.0);
    }
}
