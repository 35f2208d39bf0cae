//! Action catalog.
//!
//! A versioned table of every action a combatant can attempt, keyed by
//! [`ActionId`]. The table is parsed once from RON and is immutable
//! afterwards.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{CombatError, Result};
use crate::regions::RegionShape;

/// Catalog table version this build reads.
pub const CATALOG_VERSION: u32 = 1;

/// Embedded default catalog.
const CATALOG_RON: &str = include_str!("../data/catalog.ron");

/// Identifier of a combat action.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionId {
    /// Light attack.
    Jab,
    /// Medium attack. Breaks guard.
    Cross,
    /// Heavy attack.
    Hook,
    /// Very heavy attack.
    Uppercut,
    /// Raise guard.
    #[strum(to_string = "guard", serialize = "block")]
    Guard,
    /// Step back and slip incoming strikes.
    #[strum(to_string = "evade", serialize = "dodge")]
    Evade,
    /// Tie up the opponent at close range.
    Clinch,
    /// Do nothing and regain stamina.
    #[strum(to_string = "recover", serialize = "idle")]
    Recover,
}

/// Weight class of an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackTier {
    /// Jab.
    Light,
    /// Cross.
    Medium,
    /// Hook.
    Heavy,
    /// Uppercut.
    VeryHeavy,
}

impl ActionId {
    /// All attack identifiers, lightest first.
    pub const ATTACKS: [ActionId; 4] = [Self::Jab, Self::Cross, Self::Hook, Self::Uppercut];

    /// Parse an identifier produced by an external decision source.
    ///
    /// Unknown or empty text yields `None`, which callers treat as idle.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_str(text.trim()).ok()
    }

    /// Attack tier, or `None` for non-attacks.
    #[must_use]
    pub const fn tier(self) -> Option<AttackTier> {
        match self {
            Self::Jab => Some(AttackTier::Light),
            Self::Cross => Some(AttackTier::Medium),
            Self::Hook => Some(AttackTier::Heavy),
            Self::Uppercut => Some(AttackTier::VeryHeavy),
            Self::Guard | Self::Evade | Self::Clinch | Self::Recover => None,
        }
    }

    /// Whether this identifier deals damage.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        self.tier().is_some()
    }

    /// Heavy and very-heavy attacks.
    #[must_use]
    pub const fn is_heavy(self) -> bool {
        matches!(
            self.tier(),
            Some(AttackTier::Heavy | AttackTier::VeryHeavy)
        )
    }
}

/// Inclusive damage roll range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    /// Minimum base damage.
    pub min: u32,
    /// Maximum base damage.
    pub max: u32,
}

impl DamageRange {
    /// Midpoint of the range, rounded down.
    #[must_use]
    pub const fn midpoint(&self) -> u32 {
        self.min + (self.max - self.min) / 2
    }
}

/// Frame counts for each phase, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameData {
    /// Wind-up before the action takes effect.
    pub startup: u32,
    /// Window during which the action is live.
    pub active: u32,
    /// Cool-down after the active window.
    pub recovery: u32,
}

impl FrameData {
    /// Total length of the action.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.startup + self.active + self.recovery
    }
}

const fn default_max_chain() -> u32 {
    1
}

/// Immutable stat record for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Identifier this record describes.
    pub id: ActionId,
    /// Base damage roll.
    pub damage: DamageRange,
    /// Stamina consumed on execution.
    pub stamina_cost: u32,
    /// Base chance to land (or, for evade, to slip a strike), in percent.
    pub hit_chance: u32,
    /// Effective reach in pixels.
    pub range: i32,
    /// Phase lengths.
    pub frames: FrameData,
    /// Immediate forward movement on execution. Negative steps back.
    pub movement: i32,
    /// Added to the base crit chance, in percent.
    #[serde(default)]
    pub crit_bonus: u32,
    /// Chance to stagger the defender on a landed hit, in percent.
    #[serde(default)]
    pub stun_chance: u32,
    /// Whether this attack cuts through a raised guard.
    #[serde(default)]
    pub breaks_guard: bool,
    /// Longest run of this action that may be chained back to back.
    #[serde(default = "default_max_chain")]
    pub max_chain: u32,
    /// Damage rectangle armed during the active phase. Attacks only.
    #[serde(default)]
    pub hit_region: Option<RegionShape>,
}

impl ActionSpec {
    /// Expected base damage, used to rank attacks.
    #[must_use]
    pub const fn expected_damage(&self) -> u32 {
        self.damage.midpoint()
    }

    /// Whether this action may be queued during another's recovery.
    #[must_use]
    pub const fn is_chainable(&self) -> bool {
        self.max_chain > 1
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    actions: Vec<ActionSpec>,
}

/// Table of every action, keyed by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCatalog {
    version: u32,
    entries: BTreeMap<ActionId, ActionSpec>,
}

impl ActionCatalog {
    /// Load the embedded default catalog.
    pub fn standard() -> Result<Self> {
        Self::from_ron_str(CATALOG_RON)
    }

    /// Parse and validate a catalog from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let file: CatalogFile = ron::from_str(text).map_err(|e| CombatError::ConfigParse {
            table: "catalog",
            message: e.to_string(),
        })?;

        if file.version != CATALOG_VERSION {
            return Err(CombatError::UnsupportedVersion {
                table: "catalog",
                found: file.version,
                expected: CATALOG_VERSION,
            });
        }

        let mut entries = BTreeMap::new();
        for spec in file.actions {
            validate_spec(&spec)?;
            let id = spec.id;
            if entries.insert(id, spec).is_some() {
                return Err(CombatError::InvalidConfig(format!(
                    "duplicate catalog entry for '{id}'"
                )));
            }
        }

        for id in ActionId::iter() {
            if !entries.contains_key(&id) {
                return Err(CombatError::MissingCatalogEntry(id));
            }
        }

        tracing::debug!(
            version = file.version,
            actions = entries.len(),
            "Loaded action catalog"
        );

        Ok(Self {
            version: file.version,
            entries,
        })
    }

    /// Table version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Look up an action.
    #[must_use]
    pub fn get(&self, id: ActionId) -> Option<&ActionSpec> {
        self.entries.get(&id)
    }

    /// Iterate entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.entries.values()
    }

    /// Stamina cost of an action, zero for unknown ids.
    #[must_use]
    pub fn cost(&self, id: ActionId) -> u32 {
        self.get(id).map_or(0, |spec| spec.stamina_cost)
    }

    /// Whether `stamina` covers the full cost of `id`.
    #[must_use]
    pub fn is_affordable(&self, id: ActionId, stamina: u32) -> bool {
        self.get(id).is_some_and(|spec| stamina >= spec.stamina_cost)
    }

    /// Attacks ordered cheapest first. Ties break by identifier.
    #[must_use]
    pub fn attacks_by_cost(&self) -> Vec<&ActionSpec> {
        let mut attacks: Vec<&ActionSpec> = self.attacks().collect();
        attacks.sort_by_key(|spec| (spec.stamina_cost, spec.id));
        attacks
    }

    /// Attacks ordered by expected damage, highest first. Ties break by identifier.
    #[must_use]
    pub fn attacks_by_damage(&self) -> Vec<&ActionSpec> {
        let mut attacks: Vec<&ActionSpec> = self.attacks().collect();
        attacks.sort_by(|a, b| {
            b.expected_damage()
                .cmp(&a.expected_damage())
                .then(a.id.cmp(&b.id))
        });
        attacks
    }

    /// Render the catalog back to RON.
    pub fn to_ron_string(&self) -> Result<String> {
        #[derive(Serialize)]
        struct CatalogOut<'a> {
            version: u32,
            actions: Vec<&'a ActionSpec>,
        }

        let out = CatalogOut {
            version: self.version,
            actions: self.entries.values().collect(),
        };
        ron::ser::to_string_pretty(&out, ron::ser::PrettyConfig::default())
            .map_err(|e| CombatError::Serialization(e.to_string()))
    }

    fn attacks(&self) -> impl Iterator<Item = &ActionSpec> {
        self.entries.values().filter(|spec| spec.id.is_attack())
    }
}

fn validate_spec(spec: &ActionSpec) -> Result<()> {
    if spec.damage.min > spec.damage.max {
        return Err(CombatError::InvalidConfig(format!(
            "'{}' has damage min {} above max {}",
            spec.id, spec.damage.min, spec.damage.max
        )));
    }
    if spec.hit_chance > 100 || spec.crit_bonus > 100 || spec.stun_chance > 100 {
        return Err(CombatError::InvalidConfig(format!(
            "'{}' has a chance above 100%",
            spec.id
        )));
    }
    if spec.max_chain == 0 {
        return Err(CombatError::InvalidConfig(format!(
            "'{}' has a max chain of zero",
            spec.id
        )));
    }
    match (spec.id.is_attack(), &spec.hit_region) {
        (true, None) => Err(CombatError::InvalidConfig(format!(
            "attack '{}' has no hit region",
            spec.id
        ))),
        (false, Some(_)) => Err(CombatError::InvalidConfig(format!(
            "non-attack '{}' declares a hit region",
            spec.id
        ))),
        (true, Some(shape)) if shape.w <= 0 || shape.h <= 0 => Err(CombatError::InvalidConfig(
            format!("'{}' has an empty hit region", spec.id),
        )),
        _ => Ok(()),
    }
}
