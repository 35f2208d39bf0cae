//! Combat tuning tables.
//!
//! [`CombatConfig`] holds every constant the simulation uses outside the
//! action catalog. [`Ruleset`] bundles both tables; it is loaded once and
//! shared read-only between the engine and the decision policies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionCatalog, ActionId};
use crate::error::{CombatError, Result};
use crate::personality::{Personality, PersonalityTable};
use crate::regions::HurtRegionSets;

/// Combat table version this build reads.
pub const COMBAT_CONFIG_VERSION: u32 = 1;

/// Embedded default tuning.
const COMBAT_RON: &str = include_str!("../data/combat.ron");

/// Starting resources for a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterDefaults {
    /// Maximum health.
    pub max_health: u32,
    /// Maximum stamina.
    pub max_stamina: u32,
    /// Outgoing damage modifier, percent.
    pub power_pct: u32,
    /// Action speed modifier, percent.
    pub speed_pct: u32,
    /// Incoming damage divisor, percent.
    pub defense_pct: u32,
}

/// Ring geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Starting anchors for slot one and slot two.
    pub start_x: (i32, i32),
    /// Left rope.
    pub ring_left: i32,
    /// Right rope.
    pub ring_right: i32,
    /// Half body width kept clear of the ropes.
    pub body_inset: i32,
    /// Closest two anchors may stand.
    pub min_separation: i32,
}

/// Upper bounds of each range zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeThresholds {
    /// Clinch zone bound.
    pub clinch: i32,
    /// Punch zone bound.
    pub punch: i32,
    /// Medium zone bound.
    pub medium: i32,
    /// Safe zone bound. Beyond is far.
    pub safe: i32,
}

/// Stamina recovery and fatigue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaConfig {
    /// Regeneration per second, always applied.
    pub regen_per_sec: u32,
    /// Extra regeneration per second while idle and not guarding.
    pub idle_bonus_per_sec: u32,
    /// Stamina below this is exhausted.
    pub exhaustion_threshold: u32,
    /// Speed modifier while exhausted, percent.
    pub exhausted_speed_pct: u32,
}

/// Damage formula constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageConfig {
    /// Crit chance before the action bonus, percent.
    pub base_crit_chance: u32,
    /// Damage on a crit, percent.
    pub crit_multiplier_pct: u32,
    /// Damage against a defender caught in startup, percent.
    pub counter_multiplier_pct: u32,
    /// Damage removed by a guard, percent.
    pub guard_reduction_pct: u32,
    /// Damage kept by a guard-breaking hit, percent.
    pub guard_break_multiplier_pct: u32,
    /// Damage kept by an exhausted attacker, percent.
    pub exhaustion_penalty_pct: u32,
    /// Final damage at or above this causes heavy hit-stun.
    pub heavy_hit_threshold: u32,
    /// Final damage at or above this knocks the defender down.
    pub knockdown_threshold: u32,
}

/// Damage multiplier per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMultipliers {
    /// Head, percent.
    pub head_pct: u32,
    /// Body, percent.
    pub body_pct: u32,
    /// Legs, percent.
    pub legs_pct: u32,
}

/// Stun durations in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StunConfig {
    /// Ordinary landed hit.
    pub light_hit: u32,
    /// Crit or heavy landed hit.
    pub heavy_hit: u32,
    /// Hit absorbed by a guard.
    pub block: u32,
    /// Extra stun from an action's stun-chance proc.
    pub stagger: u32,
    /// Time on the canvas after a knockdown.
    pub knockdown: u32,
}

/// Knockback impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockbackConfig {
    /// Base impulse, pixels per second.
    pub force_per_sec: u32,
    /// Scale on crits, percent.
    pub crit_scale_pct: u32,
    /// Scale on blocked hits, percent.
    pub blocked_scale_pct: u32,
    /// Velocity kept each tick, percent.
    pub decay_pct: u32,
}

/// Forced clinch override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinchConfig {
    /// Distance below which a clinch is forced.
    pub auto_distance: i32,
    /// Clinch length in ticks.
    pub duration: u32,
    /// Stamina per second granted to both while clinched.
    pub stamina_bonus_per_sec: u32,
    /// Gap restored when the clinch breaks.
    pub break_distance: i32,
}

/// A recognized combo sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCombo {
    /// Display name.
    pub name: String,
    /// Actions that must land in this order.
    pub sequence: Vec<ActionId>,
    /// Damage multiplier for the rest of the combo, percent.
    pub bonus_pct: u32,
    /// Style points awarded on completion.
    pub style_points: u32,
}

/// Combo tracking rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboConfig {
    /// Ticks a combo stays alive without a new hit.
    pub window: u32,
    /// Recent actions kept for sequence matching.
    pub buffer_len: usize,
    /// Flat bonus per hit after the first, percent.
    pub per_hit_bonus_pct: u32,
    /// Whether hits absorbed by a guard extend the attacker's combo.
    pub count_blocked_hits: bool,
    /// Recognized sequences.
    pub sequences: Vec<NamedCombo>,
}

/// Momentum swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Largest shift from one hit, percent of the full scale.
    pub per_hit_cap_pct: u32,
}

/// Fallback policy thresholds and styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Own health below this is desperate, percent.
    pub low_health_pct: u32,
    /// Opponent health below this invites a desperate finisher, percent.
    pub opponent_low_health_pct: u32,
    /// Opponent health below this triggers finishing, percent.
    pub finishing_health_pct: u32,
    /// Own stamina below this forces recovery.
    pub low_stamina: u32,
    /// Identical choices allowed in a row before substitution.
    pub repeat_limit: u32,
    /// Style used when a policy is built without one.
    pub personality: Personality,
    /// Traits per style.
    pub personalities: PersonalityTable,
}

/// Round and match structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Rounds in a match.
    pub rounds: u32,
    /// Round length in ticks.
    pub round_ticks: u64,
    /// Minimum ticks between decisions from one source.
    pub decision_interval: u32,
    /// Most ticks run by one clock update.
    pub max_catch_up_ticks: u32,
}

/// All combat tuning outside the action catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Table version.
    pub version: u32,
    /// Starting resources.
    pub fighter: FighterDefaults,
    /// Ring geometry.
    pub arena: ArenaConfig,
    /// Range zone bounds.
    pub ranges: RangeThresholds,
    /// Stamina rules.
    pub stamina: StaminaConfig,
    /// Damage formula.
    pub damage: DamageConfig,
    /// Zone multipliers.
    pub zones: ZoneMultipliers,
    /// Stun durations.
    pub stun: StunConfig,
    /// Knockback.
    pub knockback: KnockbackConfig,
    /// Clinch override.
    pub clinch: ClinchConfig,
    /// Combo rules.
    pub combo: ComboConfig,
    /// Hurt regions per pose.
    pub hurt_regions: HurtRegionSets,
    /// Momentum.
    pub momentum: MomentumConfig,
    /// Fallback policy thresholds.
    pub policy: PolicyConfig,
    /// Round structure.
    pub round: RoundConfig,
}

impl CombatConfig {
    /// Load the embedded default tuning.
    pub fn standard() -> Result<Self> {
        Self::from_ron_str(COMBAT_RON)
    }

    /// Parse and validate tuning from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| CombatError::ConfigParse {
            table: "combat",
            message: e.to_string(),
        })?;

        if config.version != COMBAT_CONFIG_VERSION {
            return Err(CombatError::UnsupportedVersion {
                table: "combat",
                found: config.version,
                expected: COMBAT_CONFIG_VERSION,
            });
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(CombatError::InvalidConfig(msg.to_string()));

        if self.fighter.max_health == 0 || self.fighter.max_stamina == 0 {
            return invalid("fighter maximums must be positive");
        }
        if self.fighter.speed_pct == 0 || self.fighter.defense_pct == 0 {
            return invalid("speed and defense modifiers must be positive");
        }
        if self.stamina.exhausted_speed_pct == 0 {
            return invalid("exhausted speed must be positive");
        }
        let r = &self.ranges;
        if !(0 <= r.clinch && r.clinch < r.punch && r.punch < r.medium && r.medium < r.safe) {
            return invalid("range thresholds must be strictly increasing");
        }
        if self.arena.ring_left + self.arena.body_inset >= self.arena.ring_right - self.arena.body_inset
        {
            return invalid("ring is narrower than a fighter");
        }
        if self.damage.guard_reduction_pct > 100 || self.damage.base_crit_chance > 100 {
            return invalid("damage percentages out of range");
        }
        if self.knockback.decay_pct >= 100 {
            return invalid("knockback decay must be below 100%");
        }
        if self.combo.window == 0 || self.combo.buffer_len == 0 {
            return invalid("combo window and buffer must be positive");
        }
        for combo in &self.combo.sequences {
            if combo.sequence.is_empty() || combo.sequence.len() > self.combo.buffer_len {
                return Err(CombatError::InvalidConfig(format!(
                    "combo '{}' does not fit the sequence buffer",
                    combo.name
                )));
            }
        }
        for (pose, regions) in self.hurt_regions.iter() {
            if regions.is_empty() {
                return Err(CombatError::InvalidConfig(format!(
                    "pose {pose:?} has no hurt regions"
                )));
            }
        }
        for (personality, traits) in self.policy.personalities.iter() {
            let pcts = [traits.aggression_pct, traits.patience_pct, traits.adaptability_pct];
            if pcts.iter().any(|&pct| pct > 100) {
                return Err(CombatError::InvalidConfig(format!(
                    "personality '{personality}' has a trait above 100%"
                )));
            }
            if traits.weights.all().iter().all(|&w| w == 0) {
                return Err(CombatError::InvalidConfig(format!(
                    "personality '{personality}' has no positive weight"
                )));
            }
        }
        if self.round.rounds == 0 || self.round.round_ticks == 0 {
            return invalid("a match needs at least one non-empty round");
        }
        Ok(())
    }
}

/// Catalog plus tuning, immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    /// Action catalog.
    pub catalog: ActionCatalog,
    /// Tuning constants.
    pub combat: CombatConfig,
}

impl Ruleset {
    /// Load both embedded tables.
    pub fn standard() -> Result<Self> {
        Ok(Self {
            catalog: ActionCatalog::standard()?,
            combat: CombatConfig::standard()?,
        })
    }

    /// Load both tables from RON text.
    pub fn from_ron_strs(catalog: &str, combat: &str) -> Result<Self> {
        Ok(Self {
            catalog: ActionCatalog::from_ron_str(catalog)?,
            combat: CombatConfig::from_ron_str(combat)?,
        })
    }

    /// Wrap for sharing between the engine and policies.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
