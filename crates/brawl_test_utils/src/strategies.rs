//! Property-based testing strategies.

use brawl_core::catalog::ActionId;
use proptest::prelude::*;
use proptest::sample::select;
use strum::IntoEnumIterator;

/// Any action identifier.
pub fn action_id() -> impl Strategy<Value = ActionId> {
    select(ActionId::iter().collect::<Vec<_>>())
}

/// Attack identifiers only.
pub fn attack_id() -> impl Strategy<Value = ActionId> {
    select(ActionId::ATTACKS.to_vec())
}

/// A decision: an action or nothing, idle one time in four.
pub fn choice() -> impl Strategy<Value = Option<ActionId>> {
    prop_oneof![
        1 => Just(None),
        3 => action_id().prop_map(Some),
    ]
}

/// Paired choices for both corners, one per tick.
pub fn paired_script(
    max_len: usize,
) -> impl Strategy<Value = Vec<(Option<ActionId>, Option<ActionId>)>> {
    prop::collection::vec((choice(), choice()), 1..=max_len)
}

/// Distances between the two anchors that keep both inside the ring.
pub fn distance() -> impl Strategy<Value = i32> {
    40..480i32
}
