//! Collision between an armed hit region and a hurt-region set.

use serde::{Deserialize, Serialize};

use crate::action::ActiveAction;
use crate::math::{fixed_serde, Fixed};
use crate::regions::{Rect, WorldHurtRegion, Zone};
use crate::spatial::Facing;

/// Where a strike connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionHit {
    /// Highest-priority zone overlapped.
    pub zone: Zone,
    /// Effect placement, x.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Effect placement, y.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Highest-priority zone whose rectangle overlaps `hit`.
///
/// Overlapping head and body always reports head.
#[must_use]
pub fn strongest_overlap(hit: &Rect, hurt: &[WorldHurtRegion]) -> Option<Zone> {
    hurt.iter()
        .filter(|region| hit.overlaps(&region.rect))
        .map(|region| region.zone)
        .min_by_key(|zone| zone.priority())
}

/// Test an attacker's action against a defender's placed hurt regions.
///
/// Returns `None` unless the action is armed and overlaps. A hit consumes
/// the action's active window so it cannot land twice.
pub fn resolve(
    action: &mut ActiveAction,
    anchor_x: Fixed,
    facing: Facing,
    defender: &[WorldHurtRegion],
) -> Option<CollisionHit> {
    if !action.is_armed() {
        return None;
    }
    if defender.is_empty() {
        tracing::error!(action = %action.id(), "Collision check against empty hurt-region set");
        debug_assert!(false, "defender has no hurt regions");
        return None;
    }

    let rect = action.hit_region()?.to_world(anchor_x, facing);
    let zone = strongest_overlap(&rect, defender)?;
    action.mark_struck();

    let (x, y) = rect.center();
    Some(CollisionHit { zone, x, y })
}
