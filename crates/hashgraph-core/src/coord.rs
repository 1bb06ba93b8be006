// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Coordinate vector initialization: the substrate every predicate in `predicate.rs`
//! reads. Kept free of store/cache concerns so it can be unit tested in isolation.

use crate::event::{CoordEntry, Event, EventHash, Index};

/// Builds the `last_ancestors` vector for a new event from its (already-stored) parents.
///
/// - No parents: every slot unset (`-1`).
/// - Self-parent only: copy of the self-parent's vector.
/// - Other-parent only: copy of the other-parent's vector.
/// - Both: self-parent's vector, with each slot replaced by the other-parent's entry
///   whenever the other-parent's index at that slot is strictly greater.
pub fn init_last_ancestors(
    n: usize,
    self_parent: Option<&Event>,
    other_parent: Option<&Event>,
) -> Vec<CoordEntry> {
    match (self_parent, other_parent) {
        (None, None) => (0..n).map(|_| CoordEntry::unset_ancestor()).collect(),
        (Some(sp), None) => sp.last_ancestors.clone(),
        (None, Some(op)) => op.last_ancestors.clone(),
        (Some(sp), Some(op)) => sp
            .last_ancestors
            .iter()
            .zip(op.last_ancestors.iter())
            .map(|(from_sp, from_op)| {
                if from_op.index > from_sp.index {
                    from_op.clone()
                } else {
                    from_sp.clone()
                }
            })
            .collect(),
    }
}

/// `first_descendants` always starts fully unset (`+inf`); back-propagation fills it in
/// as later events from each participant are discovered to descend from this one.
pub fn init_first_descendants(n: usize) -> Vec<CoordEntry> {
    (0..n).map(|_| CoordEntry::unset_descendant()).collect()
}

/// Stamps the creator's own slot in both vectors to `(index, hex)`, establishing the
/// invariant that every event is its own latest ancestor and earliest descendant from
/// its creator's perspective.
pub fn stamp_self_slot(
    last_ancestors: &mut [CoordEntry],
    first_descendants: &mut [CoordEntry],
    creator_slot: usize,
    index: Index,
    hex: &EventHash,
) {
    last_ancestors[creator_slot] = CoordEntry {
        index,
        hash: hex.clone(),
    };
    first_descendants[creator_slot] = CoordEntry {
        index,
        hash: hex.clone(),
    };
}
