// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use hashgraph_config::PubKey;

use crate::event::{Event, EventHash, Index, Round};
use crate::root::Root;

#[derive(Debug, Clone)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Capability set the core needs from a backing event/round store. Persistence, batching
/// and memory budgeting are entirely the implementation's concern; the core only ever
/// holds a `dyn Store` behind an `Arc`.
pub trait Store: Send + Sync {
    fn get_event(&self, hex: &EventHash) -> StoreResult<Option<Event>>;

    /// Overwrites on matching hex. Used both for the initial insert and for
    /// back-propagation writes to ancestors' `first_descendants`.
    fn set_event(&self, event: Event) -> StoreResult<()>;

    fn get_root(&self, creator: &PubKey) -> StoreResult<Option<Root>>;

    /// Returns the creator's last known event hash and whether that hash is the root
    /// marker (true) or a real event (false).
    fn last_from(&self, creator: &PubKey) -> StoreResult<Option<(EventHash, bool)>>;

    fn participant_event(&self, creator: &PubKey, index: Index) -> StoreResult<Option<EventHash>>;

    fn round_witnesses(&self, round: Round) -> StoreResult<Vec<EventHash>>;

    fn cache_size(&self) -> StoreResult<usize>;

    /// Registers `hash` as a witness of `round` so that later `round_witnesses` calls can
    /// enumerate it. Added beyond the base interface: the source spec names
    /// `round_witnesses` as a read capability but is silent on how a store's witness
    /// index gets populated in the first place. The round engine calls this exactly once,
    /// the first time it determines `Witness(x) == true` for an event (see
    /// `round.rs::witness`). Default is a no-op for stores that maintain the index some
    /// other way (e.g. recomputing it from persisted round-received data).
    fn record_witness(&self, _hash: &EventHash, _round: Round) -> StoreResult<()> {
        Ok(())
    }

    // --- Reserved for the out-of-scope fame/ordering pass. Declared so the interface is
    // complete, but never called by this core. Default implementations report "not
    // supported" rather than panicking, since a conforming core never reaches them. ---

    fn get_round(&self, _hex: &EventHash) -> StoreResult<Option<Round>> {
        Err(StoreError("get_round: not supported by this store".into()))
    }

    fn set_round(&self, _hex: &EventHash, _round: Round) -> StoreResult<()> {
        Err(StoreError("set_round: not supported by this store".into()))
    }

    fn add_consensus_event(&self, _hex: &EventHash) -> StoreResult<()> {
        Err(StoreError(
            "add_consensus_event: not supported by this store".into(),
        ))
    }

    fn last_round(&self) -> StoreResult<Round> {
        Err(StoreError("last_round: not supported by this store".into()))
    }

    fn round_events(&self, _round: Round) -> StoreResult<Vec<EventHash>> {
        Err(StoreError("round_events: not supported by this store".into()))
    }

    fn known(&self) -> StoreResult<Vec<(PubKey, Index)>> {
        Err(StoreError("known: not supported by this store".into()))
    }

    fn reset(&self, _roots: Vec<(PubKey, Root)>) -> StoreResult<()> {
        Err(StoreError("reset: not supported by this store".into()))
    }

    fn consensus_events(&self) -> StoreResult<Vec<EventHash>> {
        Err(StoreError(
            "consensus_events: not supported by this store".into(),
        ))
    }
}

pub mod mem_store {
    use std::collections::HashMap;

    use parking_lot::RwLock;

    use super::*;

    /// In-process, non-persistent reference implementation of `Store`. Bundled for the
    /// core's own test suite and as a starting point for downstream integrators — never
    /// intended for production use.
    #[derive(Default)]
    pub struct MemStore {
        events: RwLock<HashMap<EventHash, Event>>,
        roots: RwLock<HashMap<PubKey, Root>>,
        // (creator, index) -> hash, kept in sync with `events` on every `set_event`.
        by_creator_index: RwLock<HashMap<(PubKey, Index), EventHash>>,
        last_by_creator: RwLock<HashMap<PubKey, EventHash>>,
        witnesses_by_round: RwLock<HashMap<Round, Vec<EventHash>>>,
        cache_size: usize,
    }

    impl MemStore {
        pub fn new(cache_size: usize) -> Self {
            Self {
                cache_size,
                ..Default::default()
            }
        }

        pub fn set_root(&self, creator: PubKey, root: Root) {
            self.roots.write().insert(creator, root);
        }
    }

    impl Store for MemStore {
        fn get_event(&self, hex: &EventHash) -> StoreResult<Option<Event>> {
            Ok(self.events.read().get(hex).cloned())
        }

        fn set_event(&self, event: Event) -> StoreResult<()> {
            let hex = event.hex.clone();
            let creator = event.creator.clone();
            let index = event.index;
            self.by_creator_index
                .write()
                .insert((creator.clone(), index), hex.clone());
            self.last_by_creator
                .write()
                .entry(creator)
                .and_modify(|last| {
                    if let Some(existing) = self.events.read().get(last) {
                        if existing.index < index {
                            *last = hex.clone();
                        }
                    } else {
                        *last = hex.clone();
                    }
                })
                .or_insert_with(|| hex.clone());
            self.events.write().insert(hex, event);
            Ok(())
        }

        fn get_root(&self, creator: &PubKey) -> StoreResult<Option<Root>> {
            Ok(self.roots.read().get(creator).cloned())
        }

        fn last_from(&self, creator: &PubKey) -> StoreResult<Option<(EventHash, bool)>> {
            if let Some(hash) = self.last_by_creator.read().get(creator) {
                return Ok(Some((hash.clone(), false)));
            }
            if let Some(root) = self.roots.read().get(creator) {
                return Ok(Some((root.x.clone(), true)));
            }
            Ok(None)
        }

        fn participant_event(
            &self,
            creator: &PubKey,
            index: Index,
        ) -> StoreResult<Option<EventHash>> {
            Ok(self
                .by_creator_index
                .read()
                .get(&(creator.clone(), index))
                .cloned())
        }

        fn round_witnesses(&self, round: Round) -> StoreResult<Vec<EventHash>> {
            Ok(self
                .witnesses_by_round
                .read()
                .get(&round)
                .cloned()
                .unwrap_or_default())
        }

        fn cache_size(&self) -> StoreResult<usize> {
            Ok(self.cache_size)
        }

        fn record_witness(&self, hash: &EventHash, round: Round) -> StoreResult<()> {
            let mut index = self.witnesses_by_round.write();
            let entry = index.entry(round).or_default();
            if !entry.contains(hash) {
                entry.push(hash.clone());
            }
            Ok(())
        }
    }
}
