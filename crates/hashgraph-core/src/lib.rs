// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hashgraph consensus core: event insertion, coordinate-vector bookkeeping, the
//! ancestor/strongly-see predicate engine, and round/witness assignment over a fixed
//! participant set. Fame voting, round-received assignment and final ordering are not
//! implemented here; they are a downstream pass built on this crate's public surface.

mod cache;
mod context;
mod coord;
mod error;
mod event;
mod hashgraph;
mod insert;
mod metrics;
mod predicate;
mod root;
mod round;
mod store;
mod verifier;

pub use context::Context;
pub use error::{ConsensusError, ConsensusResult};
pub use event::{
    CoordEntry, Event, EventHash, Index, Round, TestEvent, WireEvent, UNSET_ANCESTOR_INDEX,
    UNSET_DESCENDANT_INDEX,
};
pub use hashgraph::Hashgraph;
pub use metrics::Metrics;
pub use root::Root;
pub use round::ParentRoundInfo;
pub use store::mem_store::MemStore;
pub use store::{Store, StoreError, StoreResult};
pub use verifier::{NoopVerifier, Verifier};

/// Test-only construction helpers, mirroring the teacher's own bundled `TestBlock`/
/// in-memory-store fixtures. Public (not `#[cfg(test)]`-gated) so downstream crates can
/// build fixtures against the same helpers this crate's own tests use.
pub mod test_support {
    use std::sync::Arc;

    use hashgraph_config::{ParticipantRegistry, PubKey};
    use prometheus::Registry;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use crate::context::Context;
    use crate::event::{Event, EventHash, TestEvent};
    use crate::hashgraph::Hashgraph;
    use crate::root::Root;
    use crate::store::mem_store::MemStore;
    use crate::verifier::NoopVerifier;

    /// Builds a `ParticipantRegistry` of `n` synthetic pubkeys `[0], [1], .. [n-1]`.
    pub fn test_registry(n: u8) -> ParticipantRegistry {
        let pubkeys = (0..n).map(|i| PubKey(vec![i])).collect();
        ParticipantRegistry::new(pubkeys).expect("n > 0 and pubkeys are distinct")
    }

    /// Builds a `Hashgraph` over `n` participants, backed by a fresh `MemStore` with a
    /// genesis root registered for every participant, a `NoopVerifier`, and an unbounded
    /// commit channel whose receiver is returned alongside so tests can drain it.
    pub fn test_hashgraph(n: u8, cache_size: usize) -> (Hashgraph, UnboundedReceiver<Vec<Event>>) {
        let participants = test_registry(n);
        let store = Arc::new(MemStore::new(cache_size));
        for id in participants.ids() {
            let pubkey = participants.pubkey_of(id).cloned().expect("id in range");
            store.set_root(pubkey, Root::genesis());
        }
        let registry = Registry::new();
        let context = Arc::new(Context::new(participants, cache_size, &registry));
        let (tx, rx) = mpsc::unbounded_channel();
        let hg = Hashgraph::new(context, store, Arc::new(NoopVerifier), tx);
        (hg, rx)
    }

    /// Convenience wrapper that builds an event with `TestEvent` and inserts it,
    /// returning the assigned hash.
    pub fn insert_test(
        hg: &Hashgraph,
        hex: impl Into<EventHash>,
        creator: PubKey,
        index: crate::event::Index,
        self_parent: impl Into<EventHash>,
        other_parent: impl Into<EventHash>,
    ) -> crate::error::ConsensusResult<EventHash> {
        let ev: Event = TestEvent::new(hex, creator, index)
            .set_self_parent(self_parent)
            .set_other_parent(other_parent)
            .build();
        hg.insert_event(ev, false)
    }
}
