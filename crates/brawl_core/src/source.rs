//! Decision sources.
//!
//! Anything that picks actions for a combatant implements [`ActionSource`]:
//! the rule-based [`FallbackPolicy`](crate::policy::FallbackPolicy), the
//! sources here, or an external driver in a runner crate. A source that
//! has nothing to say returns `None`, and the combatant stays idle.

use std::collections::VecDeque;

use crate::catalog::ActionId;
use crate::combatant::CombatantView;

/// Supplies one action choice per decision point.
pub trait ActionSource {
    /// Pick an action from the two views and the ticks left in the round.
    fn choose_action(
        &mut self,
        own: &CombatantView,
        opponent: &CombatantView,
        time_remaining: u64,
    ) -> Option<ActionId>;

    /// Short label for logs and reports.
    fn name(&self) -> &str;

    /// Clear per-round memory.
    fn reset(&mut self) {}
}

/// Never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleSource;

impl ActionSource for IdleSource {
    fn choose_action(
        &mut self,
        _own: &CombatantView,
        _opponent: &CombatantView,
        _time_remaining: u64,
    ) -> Option<ActionId> {
        None
    }

    fn name(&self) -> &str {
        "idle"
    }
}

/// Replays a fixed list of choices, one per decision point.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Vec<Option<ActionId>>,
    pending: VecDeque<Option<ActionId>>,
    repeat: bool,
}

impl ScriptedSource {
    /// Play the script once, then stay idle.
    #[must_use]
    pub fn new(script: Vec<Option<ActionId>>) -> Self {
        Self {
            pending: script.iter().copied().collect(),
            script,
            repeat: false,
        }
    }

    /// Loop the script forever.
    #[must_use]
    pub fn repeating(script: Vec<Option<ActionId>>) -> Self {
        Self {
            repeat: true,
            ..Self::new(script)
        }
    }

    /// Script of plain actions with no idle gaps.
    #[must_use]
    pub fn from_actions(actions: &[ActionId]) -> Self {
        Self::new(actions.iter().copied().map(Some).collect())
    }

    /// Choices left before the script runs out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl ActionSource for ScriptedSource {
    fn choose_action(
        &mut self,
        _own: &CombatantView,
        _opponent: &CombatantView,
        _time_remaining: u64,
    ) -> Option<ActionId> {
        if self.pending.is_empty() && self.repeat {
            self.pending.extend(self.script.iter().copied());
        }
        self.pending.pop_front().flatten()
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn reset(&mut self) {
        self.pending = self.script.iter().copied().collect();
    }
}
