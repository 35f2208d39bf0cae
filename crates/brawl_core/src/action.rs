//! Frame-phased action state machine.
//!
//! An action runs `Startup -> Active -> Recovery` and then ends. Phase
//! boundaries are cumulative tick thresholds from the catalog, stretched by
//! the combatant's speed modifier when the action starts.

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionId, ActionSpec, FrameData};
use crate::regions::RegionShape;

/// Phase of a combatant's current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionPhase {
    /// No action running.
    #[default]
    None,
    /// Winding up.
    Startup,
    /// Live window. Attacks are armed.
    Active,
    /// Cooling down. Chain-eligible actions may be queued.
    Recovery,
}

/// Cumulative phase thresholds in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    /// Startup ends here.
    pub startup_end: u32,
    /// Active ends here.
    pub active_end: u32,
    /// Recovery ends here.
    pub recovery_end: u32,
}

impl PhaseThresholds {
    /// Thresholds for `frames` at `speed_pct` percent speed.
    ///
    /// Slower combatants take proportionally longer, rounded up.
    #[must_use]
    pub fn scaled(frames: &FrameData, speed_pct: u32) -> Self {
        let speed = speed_pct.max(1);
        let stretch = |ticks: u32| (ticks * 100).div_ceil(speed);
        Self {
            startup_end: stretch(frames.startup),
            active_end: stretch(frames.startup + frames.active),
            recovery_end: stretch(frames.total()),
        }
    }

    /// Phase at an elapsed tick count, or `None` once finished.
    #[must_use]
    pub const fn phase_at(&self, elapsed: u32) -> Option<ActionPhase> {
        if elapsed < self.startup_end {
            Some(ActionPhase::Startup)
        } else if elapsed < self.active_end {
            Some(ActionPhase::Active)
        } else if elapsed < self.recovery_end {
            Some(ActionPhase::Recovery)
        } else {
            None
        }
    }
}

/// A phase boundary crossed during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase before the tick.
    pub from: ActionPhase,
    /// Phase after the tick. `None` means the action ended.
    pub to: ActionPhase,
}

/// The single in-flight action of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAction {
    id: ActionId,
    phase: ActionPhase,
    elapsed: u32,
    thresholds: PhaseThresholds,
    hit_region: Option<RegionShape>,
    has_struck: bool,
    chain_len: u32,
}

impl ActiveAction {
    /// Begin `spec` at `speed_pct`.
    ///
    /// Returns `None` for actions with no frames, which take effect and end
    /// at once.
    #[must_use]
    pub fn start(spec: &ActionSpec, speed_pct: u32, chain_len: u32) -> Option<Self> {
        let thresholds = PhaseThresholds::scaled(&spec.frames, speed_pct);
        let phase = thresholds.phase_at(0)?;
        Some(Self {
            id: spec.id,
            phase,
            elapsed: 0,
            thresholds,
            hit_region: spec.hit_region,
            has_struck: false,
            chain_len,
        })
    }

    /// Action identifier.
    #[must_use]
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ActionPhase {
        self.phase
    }

    /// Ticks since the action started.
    #[must_use]
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Phase thresholds fixed at start.
    #[must_use]
    pub const fn thresholds(&self) -> PhaseThresholds {
        self.thresholds
    }

    /// Hit region for attacks.
    #[must_use]
    pub const fn hit_region(&self) -> Option<RegionShape> {
        self.hit_region
    }

    /// Whether this active window already landed.
    #[must_use]
    pub const fn has_struck(&self) -> bool {
        self.has_struck
    }

    /// Position in the current chain, starting at one.
    #[must_use]
    pub const fn chain_len(&self) -> u32 {
        self.chain_len
    }

    /// Hit region is live and has not landed yet.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.phase == ActionPhase::Active && self.hit_region.is_some() && !self.has_struck
    }

    /// Consume the active window.
    pub fn mark_struck(&mut self) {
        self.has_struck = true;
    }

    /// Advance one tick. Returns the boundary crossed, if any.
    pub fn advance(&mut self) -> Option<PhaseChange> {
        self.elapsed += 1;
        let next = self
            .thresholds
            .phase_at(self.elapsed)
            .unwrap_or(ActionPhase::None);
        if next == self.phase {
            return None;
        }
        let change = PhaseChange {
            from: self.phase,
            to: next,
        };
        self.phase = next;
        Some(change)
    }

    /// The action has run past its last frame.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == ActionPhase::None
    }
}
