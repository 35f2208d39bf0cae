//! Rule-based fallback decisions.
//!
//! [`decide`] is a pure function of the two combatants' state and a
//! [`Style`]. The first matching rule wins:
//!
//! 1. Threat response: the opponent is throwing a heavy attack, or a light
//!    one that an aggressive style counters
//! 2. Desperation: own health is low
//! 3. Finishing: the opponent's health is low and in reach
//! 4. Stamina recovery
//! 5. Range defaults
//!
//! Only the safe-range default leaves the choice open, as weighted
//! candidates. [`FallbackPolicy`] resolves those from its own roll stream
//! and wraps everything with the repetition guard.

use std::sync::Arc;

use crate::catalog::{ActionCatalog, ActionId};
use crate::combatant::{CombatantView, Slot};
use crate::config::{PolicyConfig, Ruleset};
use crate::personality::{ActionWeights, Adaptation, Personality, PersonalityTraits, TacticalMode};
use crate::rng::{CombatRng, SeededRng};
use crate::source::ActionSource;
use crate::spatial::RangeZone;

/// Roll stream of the slot one policy. Engine combatants use 0 and 1.
const POLICY_STREAM: u64 = 2;

/// Aggression above which a light attack is countered with a jab.
const COUNTER_AGGRESSION_PCT: u32 = 50;

/// Health below which the open choice reweights, percent.
const PRESSURE_HEALTH_PCT: u32 = 30;

/// Stamina below which the open choice favors cheap actions.
const TIRED_STAMINA: u32 = 30;

/// Aggression above which a hurt fighter swings harder instead of covering.
const RECKLESS_AGGRESSION_PCT: u32 = 60;

/// Patience above which a fighter under fire defends.
const PATIENT_PCT: u32 = 60;

/// Actions the open choice draws from.
const OPEN_CHOICES: [ActionId; 7] = [
    ActionId::Jab,
    ActionId::Cross,
    ActionId::Hook,
    ActionId::Uppercut,
    ActionId::Guard,
    ActionId::Evade,
    ActionId::Recover,
];

const ATTACKS: [ActionId; 4] = [ActionId::Jab, ActionId::Cross, ActionId::Hook, ActionId::Uppercut];
const DEFENSES: [ActionId; 2] = [ActionId::Guard, ActionId::Evade];

/// Everything a fallback decision reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    /// Own health, percent.
    pub health_pct: u32,
    /// Own stamina, whole points.
    pub stamina: u32,
    /// Own stamina, percent.
    pub stamina_pct: u32,
    /// Opponent health, percent.
    pub opponent_health_pct: u32,
    /// Opponent stamina, percent.
    pub opponent_stamina_pct: u32,
    /// Current range zone.
    pub range: RangeZone,
    /// What the opponent is doing.
    pub opponent_action: Option<ActionId>,
    /// Own previous action.
    pub last_action: Option<ActionId>,
}

impl PolicyInput {
    /// Build from two views.
    #[must_use]
    pub fn from_views(own: &CombatantView, opponent: &CombatantView, rules: &Ruleset) -> Self {
        let distance = (own.x - opponent.x).abs();
        Self {
            health_pct: own.health_pct,
            stamina: own.stamina,
            stamina_pct: own.stamina_pct,
            opponent_health_pct: opponent.health_pct,
            opponent_stamina_pct: opponent.stamina_pct,
            range: RangeZone::classify(distance, &rules.combat.ranges),
            opponent_action: opponent.action,
            last_action: own.last_action,
        }
    }
}

/// A personality's traits in its current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Traits from the personality table.
    pub traits: PersonalityTraits,
    /// Mode from the exchange tally.
    pub mode: TacticalMode,
}

/// What the winning rule settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// One action.
    Action(ActionId),
    /// Pick one of these by weight.
    Weighted(Vec<(ActionId, u32)>),
}

impl Decision {
    /// Settle the decision, rolling when the choice is open.
    pub fn resolve<R: CombatRng + ?Sized>(self, rng: &mut R) -> ActionId {
        match self {
            Self::Action(id) => id,
            Self::Weighted(candidates) => {
                weighted_pick(&candidates, rng).unwrap_or(ActionId::Recover)
            }
        }
    }
}

/// Decide for `input`.
#[must_use]
pub fn decide(
    input: &PolicyInput,
    catalog: &ActionCatalog,
    config: &PolicyConfig,
    style: &Style,
) -> Decision {
    use Decision::Action;

    let affordable = |id: ActionId| catalog.is_affordable(id, input.stamina);
    let defend = || {
        [ActionId::Evade, ActionId::Guard]
            .into_iter()
            .find(|&id| affordable(id))
    };

    // 1. Threat response
    if input.opponent_action.is_some_and(ActionId::is_heavy) {
        return Action(defend().unwrap_or_else(|| cheapest_attack(catalog, input.stamina)));
    }
    if input.opponent_action.is_some_and(ActionId::is_attack)
        && style.traits.aggression_pct > COUNTER_AGGRESSION_PCT
        && affordable(ActionId::Jab)
    {
        return Action(ActionId::Jab);
    }

    // 2. Desperation
    if input.health_pct < config.low_health_pct {
        if input.opponent_health_pct < config.opponent_low_health_pct && input.range.is_striking() {
            if let Some(finisher) = heaviest_affordable(catalog, input.stamina) {
                return Action(finisher);
            }
        }
        return Action(defend().unwrap_or(ActionId::Recover));
    }

    // 3. Finishing
    if input.opponent_health_pct < config.finishing_health_pct && input.range.is_striking() {
        return Action(heaviest_affordable(catalog, input.stamina).unwrap_or(ActionId::Recover));
    }

    // 4. Stamina recovery
    if input.stamina < config.low_stamina {
        return Action(ActionId::Recover);
    }

    // 5. Range defaults
    match input.range {
        RangeZone::Clinch => Action(
            heaviest_affordable(catalog, input.stamina)
                .unwrap_or_else(|| cheapest_attack(catalog, input.stamina)),
        ),
        RangeZone::Punch => {
            let next = match input.last_action {
                Some(ActionId::Jab) => Some(ActionId::Cross),
                Some(ActionId::Cross) => Some(ActionId::Hook),
                _ => None,
            };
            Action(next.filter(|&id| affordable(id)).unwrap_or(ActionId::Jab))
        }
        RangeZone::Medium | RangeZone::Far => Action(cheapest_attack(catalog, input.stamina)),
        RangeZone::Safe => open_choice(input, catalog, style),
    }
}

fn open_choice(input: &PolicyInput, catalog: &ActionCatalog, style: &Style) -> Decision {
    let weights = style_weights(input, style);
    let candidates: Vec<(ActionId, u32)> = OPEN_CHOICES
        .into_iter()
        .filter(|&id| catalog.is_affordable(id, input.stamina))
        .map(|id| (id, weights.of(id)))
        .filter(|&(_, weight)| weight > 0)
        .collect();
    if candidates.is_empty() {
        Decision::Action(cheapest_attack(catalog, input.stamina))
    } else {
        Decision::Weighted(candidates)
    }
}

/// Weights for the open choice: the style's base weights bent by the
/// situation and the current mode.
#[must_use]
pub fn style_weights(input: &PolicyInput, style: &Style) -> ActionWeights {
    let traits = &style.traits;
    let mut weights = traits.weights;

    if input.health_pct < PRESSURE_HEALTH_PCT {
        if traits.aggression_pct > RECKLESS_AGGRESSION_PCT {
            weights.scale(&[ActionId::Hook, ActionId::Uppercut], 150);
        } else {
            weights.scale(&DEFENSES, 150);
        }
    }
    if input.opponent_health_pct < PRESSURE_HEALTH_PCT {
        weights.scale(&[ActionId::Cross, ActionId::Hook], 130);
        weights.scale(&[ActionId::Uppercut], 140);
    }
    if input.stamina < TIRED_STAMINA {
        weights.scale(&[ActionId::Jab], 150);
        weights.scale(&[ActionId::Hook], 50);
        weights.scale(&[ActionId::Uppercut], 30);
        weights.scale(&[ActionId::Recover], 200);
    }
    if input.opponent_action.is_some_and(ActionId::is_attack) {
        if traits.patience_pct > PATIENT_PCT {
            weights.scale(&[ActionId::Guard], 150);
            weights.scale(&[ActionId::Evade], 130);
        } else {
            weights.scale(&[ActionId::Jab], 130);
        }
    }

    match style.mode {
        TacticalMode::Normal => {}
        TacticalMode::Pressing => weights.scale(&ATTACKS, 130),
        TacticalMode::Cautious => weights.scale(&DEFENSES, 130),
    }
    weights
}

/// Pick one candidate with probability proportional to its weight.
///
/// `None` when every weight is zero.
pub fn weighted_pick<R: CombatRng + ?Sized>(
    candidates: &[(ActionId, u32)],
    rng: &mut R,
) -> Option<ActionId> {
    let total: u32 = candidates.iter().map(|&(_, weight)| weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.roll_range(0, total - 1);
    candidates.iter().find_map(|&(id, weight)| {
        if roll < weight {
            Some(id)
        } else {
            roll -= weight;
            None
        }
    })
}

/// Replacement used when the same choice comes up too often in a row.
#[must_use]
pub fn rotate(current: ActionId, catalog: &ActionCatalog, stamina: u32) -> ActionId {
    let next = match current {
        ActionId::Jab => ActionId::Cross,
        ActionId::Cross => ActionId::Hook,
        _ => ActionId::Jab,
    };
    if catalog.is_affordable(next, stamina) {
        next
    } else {
        ActionId::Jab
    }
}

fn cheapest_attack(catalog: &ActionCatalog, stamina: u32) -> ActionId {
    let attacks = catalog.attacks_by_cost();
    attacks
        .iter()
        .find(|spec| stamina >= spec.stamina_cost)
        .or_else(|| attacks.first())
        .map_or(ActionId::Jab, |spec| spec.id)
}

fn heaviest_affordable(catalog: &ActionCatalog, stamina: u32) -> Option<ActionId> {
    catalog
        .attacks_by_damage()
        .into_iter()
        .find(|spec| stamina >= spec.stamina_cost)
        .map(|spec| spec.id)
}

/// The fallback decision source.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    rules: Arc<Ruleset>,
    personality: Personality,
    rng: SeededRng,
    adaptation: Adaptation,
    last_choice: Option<ActionId>,
    repeats: u32,
}

impl FallbackPolicy {
    /// Policy over the shared rules in the configured default style.
    #[must_use]
    pub fn new(rules: Arc<Ruleset>) -> Self {
        let personality = rules.combat.policy.personality;
        Self {
            rules,
            personality,
            rng: SeededRng::new(0, POLICY_STREAM),
            adaptation: Adaptation::default(),
            last_choice: None,
            repeats: 0,
        }
    }

    /// Use another style.
    #[must_use]
    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// Draw open choices from the match seed, on a stream owned by `slot`.
    #[must_use]
    pub fn seeded(mut self, seed: u64, slot: Slot) -> Self {
        self.rng = SeededRng::new(seed, POLICY_STREAM + slot.index() as u64);
        self
    }

    /// Current style.
    #[must_use]
    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> TacticalMode {
        self.adaptation.mode()
    }

    fn style(&self) -> Style {
        Style {
            traits: *self.rules.combat.policy.personalities.get(self.personality),
            mode: self.adaptation.mode(),
        }
    }

    /// Decide and apply the repetition guard.
    pub fn next_action(&mut self, input: &PolicyInput) -> ActionId {
        let style = self.style();
        let config = &self.rules.combat.policy;
        let mut choice = decide(input, &self.rules.catalog, config, &style).resolve(&mut self.rng);

        if self.last_choice == Some(choice) {
            self.repeats += 1;
            if self.repeats >= config.repeat_limit {
                let substitute = rotate(choice, &self.rules.catalog, input.stamina);
                tracing::trace!(from = %choice, to = %substitute, "Repetition guard");
                choice = substitute;
            }
        }
        if self.last_choice != Some(choice) {
            self.repeats = 0;
        }

        self.last_choice = Some(choice);
        choice
    }
}

impl ActionSource for FallbackPolicy {
    fn choose_action(
        &mut self,
        own: &CombatantView,
        opponent: &CombatantView,
        _time_remaining: u64,
    ) -> Option<ActionId> {
        let adaptability = self.style().traits.adaptability_pct;
        self.adaptation.observe(own.health, opponent.health, adaptability);
        if !own.can_act {
            return None;
        }
        let input = PolicyInput::from_views(own, opponent, &self.rules);
        Some(self.next_action(&input))
    }

    fn name(&self) -> &str {
        "fallback"
    }

    fn reset(&mut self) {
        self.last_choice = None;
        self.repeats = 0;
        self.adaptation.reset();
    }
}
