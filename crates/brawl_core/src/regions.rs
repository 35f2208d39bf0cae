//! Hit and hurt region geometry.
//!
//! Regions are authored as offsets from a combatant's anchor while facing
//! right, with y measured up from the ring floor. World rectangles are
//! derived on demand from the current position, facing and pose, and are
//! never stored.

use serde::{Deserialize, Serialize};

use crate::config::ZoneMultipliers;
use crate::math::{fixed_serde, Fixed};
use crate::spatial::Facing;

/// Body zone carried by a hurt region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Highest priority.
    Head,
    /// Torso.
    Body,
    /// Lowest priority.
    Legs,
}

impl Zone {
    /// Collision priority. Lower wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Head => 0,
            Self::Body => 1,
            Self::Legs => 2,
        }
    }

    /// Damage multiplier for this zone, in percent.
    #[must_use]
    pub const fn multiplier_pct(self, zones: &ZoneMultipliers) -> u32 {
        match self {
            Self::Head => zones.head_pct,
            Self::Body => zones.body_pct,
            Self::Legs => zones.legs_pct,
        }
    }
}

/// Stance that selects a combatant's hurt-region set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pose {
    /// Neutral stance.
    #[default]
    Idle,
    /// Guard raised.
    Blocking,
    /// Ducked low while evading.
    Crouching,
    /// Throwing a strike.
    Attacking,
    /// On the canvas.
    Knockdown,
}

/// Rectangle offset, facing-right space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionShape {
    /// Horizontal offset of the near edge from the anchor.
    pub x: i32,
    /// Height of the bottom edge above the floor.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl RegionShape {
    /// Place this shape in world space.
    ///
    /// Facing left mirrors the offset around the anchor.
    #[must_use]
    pub fn to_world(&self, anchor_x: Fixed, facing: Facing) -> Rect {
        let x = match facing {
            Facing::Right => anchor_x + Fixed::from_num(self.x),
            Facing::Left => anchor_x - Fixed::from_num(self.x) - Fixed::from_num(self.w),
        };
        Rect {
            x,
            y: Fixed::from_num(self.y),
            w: Fixed::from_num(self.w),
            h: Fixed::from_num(self.h),
        }
    }
}

/// World-space axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Bottom edge.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Width.
    #[serde(with = "fixed_serde")]
    pub w: Fixed,
    /// Height.
    #[serde(with = "fixed_serde")]
    pub h: Fixed,
}

impl Rect {
    /// Strict overlap. Rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> (Fixed, Fixed) {
        let two = Fixed::from_num(2);
        (self.x + self.w / two, self.y + self.h / two)
    }
}

/// Damage-receiving rectangle tagged with a body zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurtRegion {
    /// Zone struck when this region is hit.
    pub zone: Zone,
    /// Offset rectangle.
    pub rect: RegionShape,
}

/// A hurt region placed in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldHurtRegion {
    /// Zone tag.
    pub zone: Zone,
    /// World rectangle.
    pub rect: Rect,
}

/// Hurt-region sets for every pose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurtRegionSets {
    /// Neutral stance.
    pub idle: Vec<HurtRegion>,
    /// Guard raised.
    pub blocking: Vec<HurtRegion>,
    /// Evading low.
    pub crouching: Vec<HurtRegion>,
    /// Mid-strike.
    pub attacking: Vec<HurtRegion>,
    /// Knocked down.
    pub knockdown: Vec<HurtRegion>,
}

impl HurtRegionSets {
    /// Regions for a pose.
    #[must_use]
    pub fn for_pose(&self, pose: Pose) -> &[HurtRegion] {
        match pose {
            Pose::Idle => &self.idle,
            Pose::Blocking => &self.blocking,
            Pose::Crouching => &self.crouching,
            Pose::Attacking => &self.attacking,
            Pose::Knockdown => &self.knockdown,
        }
    }

    /// World-space regions for a pose at an anchor.
    #[must_use]
    pub fn place(&self, pose: Pose, anchor_x: Fixed, facing: Facing) -> Vec<WorldHurtRegion> {
        self.for_pose(pose)
            .iter()
            .map(|region| WorldHurtRegion {
                zone: region.zone,
                rect: region.rect.to_world(anchor_x, facing),
            })
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Pose, &[HurtRegion])> {
        [
            Pose::Idle,
            Pose::Blocking,
            Pose::Crouching,
            Pose::Attacking,
            Pose::Knockdown,
        ]
        .into_iter()
        .map(move |pose| (pose, self.for_pose(pose)))
    }
}
