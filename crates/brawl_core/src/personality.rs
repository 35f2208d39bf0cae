//! Fighting styles for the fallback policy.
//!
//! A [`Personality`] names one row of the [`PersonalityTable`] in the
//! policy tuning. Traits never change which decision rule fires. They gate
//! the counter jab and weight the open choice at safe range.
//! [`Adaptation`] watches the exchanges and leans adaptable styles toward
//! offense or defense.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::catalog::ActionId;

/// Exchanges observed before the mode may change.
const MIN_EXCHANGES: u32 = 5;

/// Styles below this adaptability keep the normal mode.
const MIN_ADAPTABILITY_PCT: u32 = 30;

/// Share of the damage dealt above which a fighter presses, percent.
const PRESS_RATIO_PCT: u32 = 70;

/// Share of the damage dealt below which a fighter turtles, percent.
const CAUTION_RATIO_PCT: u32 = 30;

/// Named fighting style.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Personality {
    /// Heavy hitter, rarely defends.
    Destroyer,
    /// Jabs to set up, patient.
    Tactician,
    /// Evasive counter-puncher.
    Ghost,
    /// Unpredictable.
    Wildcard,
    /// Neutral weights.
    #[default]
    Balanced,
    /// Constant pressure.
    Aggressive,
    /// Guard first.
    Defensive,
}

/// Relative preference per action, percent. 100 is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionWeights {
    /// Jab.
    pub jab: u32,
    /// Cross.
    pub cross: u32,
    /// Hook.
    pub hook: u32,
    /// Uppercut.
    pub uppercut: u32,
    /// Guard.
    pub guard: u32,
    /// Evade.
    pub evade: u32,
    /// Recover.
    pub recover: u32,
}

impl ActionWeights {
    /// Weight of `id`. Actions without a slot weigh nothing.
    #[must_use]
    pub fn of(&self, id: ActionId) -> u32 {
        match id {
            ActionId::Jab => self.jab,
            ActionId::Cross => self.cross,
            ActionId::Hook => self.hook,
            ActionId::Uppercut => self.uppercut,
            ActionId::Guard => self.guard,
            ActionId::Evade => self.evade,
            ActionId::Recover => self.recover,
            ActionId::Clinch => 0,
        }
    }

    /// Scale the weight of each listed action by `pct`.
    pub fn scale(&mut self, ids: &[ActionId], pct: u32) {
        for &id in ids {
            let slot = match id {
                ActionId::Jab => &mut self.jab,
                ActionId::Cross => &mut self.cross,
                ActionId::Hook => &mut self.hook,
                ActionId::Uppercut => &mut self.uppercut,
                ActionId::Guard => &mut self.guard,
                ActionId::Evade => &mut self.evade,
                ActionId::Recover => &mut self.recover,
                ActionId::Clinch => continue,
            };
            *slot = slot.saturating_mul(pct) / 100;
        }
    }

    pub(crate) fn all(&self) -> [u32; 7] {
        [
            self.jab,
            self.cross,
            self.hook,
            self.uppercut,
            self.guard,
            self.evade,
            self.recover,
        ]
    }
}

/// One style's tendencies. Percent values run 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    /// Above 50 the fighter counters light attacks with a jab.
    pub aggression_pct: u32,
    /// Above 60 the fighter defends rather than counters under fire.
    pub patience_pct: u32,
    /// How readily the style shifts mode with the flow of the fight.
    pub adaptability_pct: u32,
    /// Base preference per action.
    pub weights: ActionWeights,
}

/// Traits for every [`Personality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityTable {
    /// Destroyer.
    pub destroyer: PersonalityTraits,
    /// Tactician.
    pub tactician: PersonalityTraits,
    /// Ghost.
    pub ghost: PersonalityTraits,
    /// Wildcard.
    pub wildcard: PersonalityTraits,
    /// Balanced.
    pub balanced: PersonalityTraits,
    /// Aggressive.
    pub aggressive: PersonalityTraits,
    /// Defensive.
    pub defensive: PersonalityTraits,
}

impl PersonalityTable {
    /// Traits for a style.
    #[must_use]
    pub fn get(&self, personality: Personality) -> &PersonalityTraits {
        match personality {
            Personality::Destroyer => &self.destroyer,
            Personality::Tactician => &self.tactician,
            Personality::Ghost => &self.ghost,
            Personality::Wildcard => &self.wildcard,
            Personality::Balanced => &self.balanced,
            Personality::Aggressive => &self.aggressive,
            Personality::Defensive => &self.defensive,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Personality, &PersonalityTraits)> {
        use strum::IntoEnumIterator;
        Personality::iter().map(move |p| (p, self.get(p)))
    }
}

/// How the fight is going for an adaptable style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TacticalMode {
    /// Base weights.
    #[default]
    Normal,
    /// Winning the exchanges; attacks weigh more.
    Pressing,
    /// Losing the exchanges; defense weighs more.
    Cautious,
}

/// Running exchange tally read from successive health readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adaptation {
    damage_dealt: u32,
    damage_taken: u32,
    exchanges: u32,
    last_seen: Option<(u32, u32)>,
    mode: TacticalMode,
}

impl Adaptation {
    /// Record the current health of both fighters.
    ///
    /// Any health lost since the previous reading counts as one exchange.
    pub fn observe(&mut self, own_health: u32, opponent_health: u32, adaptability_pct: u32) {
        if let Some((own_before, opponent_before)) = self.last_seen {
            let taken = own_before.saturating_sub(own_health);
            let dealt = opponent_before.saturating_sub(opponent_health);
            if taken > 0 || dealt > 0 {
                self.damage_taken += taken;
                self.damage_dealt += dealt;
                self.exchanges += 1;
            }
        }
        self.last_seen = Some((own_health, opponent_health));

        if adaptability_pct < MIN_ADAPTABILITY_PCT || self.exchanges < MIN_EXCHANGES {
            return;
        }
        let total = (self.damage_dealt + self.damage_taken).max(1);
        let ratio = self.damage_dealt * 100 / total;
        let mode = if ratio > PRESS_RATIO_PCT {
            TacticalMode::Pressing
        } else if ratio < CAUTION_RATIO_PCT {
            TacticalMode::Cautious
        } else {
            TacticalMode::Normal
        };
        if mode != self.mode {
            tracing::debug!(?mode, ratio, exchanges = self.exchanges, "Tactical mode changed");
            self.mode = mode;
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> TacticalMode {
        self.mode
    }

    /// Forget every exchange.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;

    fn table() -> PersonalityTable {
        CombatConfig::standard().unwrap().policy.personalities
    }

    #[test]
    fn test_names_parse() {
        assert_eq!("ghost".parse::<Personality>().unwrap(), Personality::Ghost);
        assert_eq!("Destroyer".parse::<Personality>().unwrap(), Personality::Destroyer);
        assert!("berserker".parse::<Personality>().is_err());
        assert_eq!(Personality::default().to_string(), "balanced");
    }

    #[test]
    fn test_standard_table() {
        let table = table();
        let destroyer = table.get(Personality::Destroyer);
        assert_eq!(destroyer.aggression_pct, 90);
        assert_eq!(destroyer.weights.of(ActionId::Hook), 150);
        assert_eq!(table.get(Personality::Ghost).weights.of(ActionId::Evade), 150);
        let balanced = table.get(Personality::Balanced);
        assert_eq!(balanced.aggression_pct, 50);
        assert_eq!(balanced.weights.of(ActionId::Jab), 100);
        assert_eq!(balanced.weights.of(ActionId::Recover), 20);
        assert_eq!(balanced.weights.of(ActionId::Clinch), 0);
    }

    #[test]
    fn test_scale_weights() {
        let mut weights = table().balanced.weights;
        weights.scale(&[ActionId::Hook, ActionId::Uppercut], 150);
        weights.scale(&[ActionId::Clinch], 500);
        assert_eq!(weights.hook, 150);
        assert_eq!(weights.uppercut, 150);
        assert_eq!(weights.jab, 100);
    }

    #[test]
    fn test_adaptation_needs_exchanges() {
        let mut adaptation = Adaptation::default();
        adaptation.observe(100, 100, 50);
        for opponent in [90, 80, 70, 60] {
            adaptation.observe(100, opponent, 50);
        }
        assert_eq!(adaptation.mode(), TacticalMode::Normal, "four exchanges");
        adaptation.observe(100, 50, 50);
        assert_eq!(adaptation.mode(), TacticalMode::Pressing);
    }

    #[test]
    fn test_adaptation_turns_cautious_when_losing() {
        let mut adaptation = Adaptation::default();
        adaptation.observe(100, 100, 90);
        for own in [90, 80, 70, 60, 50] {
            adaptation.observe(own, 100, 90);
        }
        assert_eq!(adaptation.mode(), TacticalMode::Cautious);

        adaptation.reset();
        assert_eq!(adaptation, Adaptation::default());
    }

    #[test]
    fn test_rigid_style_never_adapts() {
        let mut adaptation = Adaptation::default();
        adaptation.observe(100, 100, 20);
        for own in [90, 80, 70, 60, 50, 40] {
            adaptation.observe(own, 100, 20);
        }
        assert_eq!(adaptation.mode(), TacticalMode::Normal);
    }

    #[test]
    fn test_quiet_readings_are_not_exchanges() {
        let mut adaptation = Adaptation::default();
        for _ in 0..10 {
            adaptation.observe(100, 100, 90);
        }
        adaptation.observe(100, 100, 90);
        assert_eq!(adaptation.mode(), TacticalMode::Normal);
    }
}
