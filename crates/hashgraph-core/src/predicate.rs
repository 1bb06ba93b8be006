// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ancestor, SelfAncestor, See, StronglySee, OldestSelfAncestorToSee: pure functions of
//! the stored DAG, each memoized. None of these ever fail — an absent event degrades the
//! answer to `false`/empty rather than raising, per the spec's error-handling policy.

use tracing::trace;

use crate::event::{Event, EventHash, Index};
use crate::hashgraph::Hashgraph;

impl Hashgraph {
    /// True iff `y` lies on any directed path of parent edges from `x`. Reflexive.
    pub fn ancestor(&self, x: &EventHash, y: &EventHash) -> bool {
        if x == y {
            return true;
        }
        if let Some(hit) = self.caches.get_ancestor(x, y) {
            self.context.metrics.record_cache("ancestor", true);
            return hit;
        }
        self.context.metrics.record_cache("ancestor", false);

        let (ex, ey) = match (self.fetch(x), self.fetch(y)) {
            (Some(ex), Some(ey)) => (ex, ey),
            _ => {
                trace!(%x, %y, "ancestor: missing event, degrading to false");
                return false;
            }
        };

        let result = self.ancestor_resolved(&ex, &ey);
        self.caches.put_ancestor(x, y, result);
        result
    }

    fn ancestor_resolved(&self, ex: &Event, ey: &Event) -> bool {
        let Some(creator_id) = self.context.participants.id_of(&ey.creator) else {
            return false;
        };
        let slot = creator_id.value() as usize;
        match ex.last_ancestors.get(slot) {
            Some(entry) => entry.index >= ey.index,
            None => false,
        }
    }

    /// True iff `y` is reachable from `x` following only self-parent edges. Reflexive.
    pub fn self_ancestor(&self, x: &EventHash, y: &EventHash) -> bool {
        if x == y {
            return true;
        }
        if let Some(hit) = self.caches.get_self_ancestor(x, y) {
            self.context.metrics.record_cache("self_ancestor", true);
            return hit;
        }
        self.context.metrics.record_cache("self_ancestor", false);

        let (ex, ey) = match (self.fetch(x), self.fetch(y)) {
            (Some(ex), Some(ey)) => (ex, ey),
            _ => return false,
        };

        let result = ex.creator == ey.creator && ex.index >= ey.index;
        self.caches.put_self_ancestor(x, y, result);
        result
    }

    /// Equal to `ancestor`. Fork detection is not required at this layer: the
    /// insertion-time self-parent check already guarantees no two events from the same
    /// creator share an index.
    pub fn see(&self, x: &EventHash, y: &EventHash) -> bool {
        self.ancestor(x, y)
    }

    /// The oldest event `z` such that `SelfAncestor(x, z) && See(z, y)`, or `None`.
    pub fn oldest_self_ancestor_to_see(&self, x: &EventHash, y: &EventHash) -> Option<EventHash> {
        if let Some(hit) = self.caches.get_oldest_self_ancestor_to_see(x, y) {
            self.context
                .metrics
                .record_cache("oldest_self_ancestor_to_see", true);
            return if hit.is_empty() { None } else { Some(hit) };
        }
        self.context
            .metrics
            .record_cache("oldest_self_ancestor_to_see", false);

        let (ex, ey) = match (self.fetch(x), self.fetch(y)) {
            (Some(ex), Some(ey)) => (ex, ey),
            _ => return None,
        };

        let Some(creator_id) = self.context.participants.id_of(&ex.creator) else {
            return None;
        };
        let slot = creator_id.value() as usize;
        let result = match ey.first_descendants.get(slot) {
            Some(entry) if entry.index <= ex.index && entry.index != Index::MAX => {
                Some(entry.hash.clone())
            }
            _ => None,
        };

        self.caches.put_oldest_self_ancestor_to_see(
            x,
            y,
            result.clone().unwrap_or_else(EventHash::empty),
        );
        result
    }

    /// True iff the number of participant slots through which `x` can reach `y` is at
    /// least the super-majority threshold.
    pub fn strongly_see(&self, x: &EventHash, y: &EventHash) -> bool {
        if let Some(hit) = self.caches.get_strongly_see(x, y) {
            self.context.metrics.record_cache("strongly_see", true);
            return hit;
        }
        self.context.metrics.record_cache("strongly_see", false);

        let (ex, ey) = match (self.fetch(x), self.fetch(y)) {
            (Some(ex), Some(ey)) => (ex, ey),
            _ => return false,
        };

        let count = ex
            .last_ancestors
            .iter()
            .zip(ey.first_descendants.iter())
            .filter(|(la, fd)| la.index >= fd.index)
            .count();

        let result = count >= self.context.super_majority();
        self.caches.put_strongly_see(x, y, result);
        result
    }

    pub(crate) fn fetch(&self, hex: &EventHash) -> Option<Event> {
        match self.store.get_event(hex) {
            Ok(ev) => ev,
            Err(e) => {
                trace!(%hex, error = %e, "store error while fetching event, treating as absent");
                None
            }
        }
    }
}
