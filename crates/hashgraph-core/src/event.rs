// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use hashgraph_config::{ParticipantId, PubKey};
use serde::{Deserialize, Serialize};

/// Round label. `-1` denotes "unresolved" (event absent or not yet computed).
pub type Round = i64;

/// Per-creator sequence number. `-1` is used as a sentinel for "unset".
pub type Index = i64;

/// Sentinel used in `first_descendants` slots that have not yet been back-filled.
pub const UNSET_DESCENDANT_INDEX: Index = Index::MAX;
/// Sentinel used in `last_ancestors` slots for a participant this event has no knowledge of.
pub const UNSET_ANCESTOR_INDEX: Index = -1;

/// Stable content hash of an event, used as its identity. Opaque to the core beyond
/// equality/ordering and hex display; actual hashing happens at the wire-codec boundary,
/// out of scope for this crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct EventHash(pub Vec<u8>);

impl EventHash {
    /// The empty hash stands for "no parent" (self_parent of a creator's first event,
    /// or other_parent of a self-parent-only event).
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EventHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl From<&str> for EventHash {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// One slot of a coordinate vector: the (index, hash) of an event reachable through, or
/// descending from, a given participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordEntry {
    pub index: Index,
    pub hash: EventHash,
}

impl CoordEntry {
    pub fn unset_ancestor() -> Self {
        Self {
            index: UNSET_ANCESTOR_INDEX,
            hash: EventHash::empty(),
        }
    }

    pub fn unset_descendant() -> Self {
        Self {
            index: UNSET_DESCENDANT_INDEX,
            hash: EventHash::empty(),
        }
    }
}

/// A signed event as known to the core, including the coordinate vectors maintained
/// incrementally by the insertion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub hex: EventHash,
    pub creator: PubKey,
    pub index: Index,
    pub self_parent: EventHash,
    pub other_parent: EventHash,
    pub transactions: Vec<Vec<u8>>,
    pub timestamp: u64,
    pub signature: Vec<u8>,

    pub topological_index: Index,
    pub round_received: Option<Round>,

    pub last_ancestors: Vec<CoordEntry>,
    pub first_descendants: Vec<CoordEntry>,

    // Wire-form fields, populated on demand by InsertEvent(set_wire_info=true) or by
    // ReadWireInfo; otherwise left `None`.
    pub self_parent_index: Option<Index>,
    pub other_parent_creator_id: Option<ParticipantId>,
    pub other_parent_index: Option<Index>,
    pub creator_id: Option<ParticipantId>,
}

impl Event {
    pub fn is_loaded(&self) -> bool {
        !self.transactions.is_empty()
    }

    /// Wire-form body: the subset of fields re-serialized for compact network transfer.
    /// Carries the original signature but none of the core's derived bookkeeping
    /// (coordinate vectors, topological index).
    pub fn to_wire(&self) -> WireEvent {
        WireEvent {
            creator: self.creator.clone(),
            index: self.index,
            self_parent_index: self.self_parent_index,
            other_parent_creator_id: self.other_parent_creator_id,
            other_parent_index: self.other_parent_index,
            creator_id: self.creator_id,
            transactions: self.transactions.clone(),
            timestamp: self.timestamp,
            signature: self.signature.clone(),
        }
    }
}

/// Compact wire representation of an event body, reconstructed into a full `Event` via
/// `ReadWireInfo` once the referenced parents are resolved against a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    pub creator: PubKey,
    pub index: Index,
    pub self_parent_index: Option<Index>,
    pub other_parent_creator_id: Option<ParticipantId>,
    pub other_parent_index: Option<Index>,
    pub creator_id: Option<ParticipantId>,
    pub transactions: Vec<Vec<u8>>,
    pub timestamp: u64,
    pub signature: Vec<u8>,
}

impl WireEvent {
    /// Canonical, byte-stable encoding of the wire body (same bytes for the same
    /// logical value, independent of field insertion order) for transports that need
    /// a deterministic on-wire representation rather than `serde_json`'s.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(self)
    }

    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, bcs::Error> {
        bcs::from_bytes(bytes)
    }
}

/// Builds `Event`s for tests without going through the insertion pipeline, mirroring the
/// teacher's `TestBlock` builder.
pub struct TestEvent {
    hex: EventHash,
    creator: PubKey,
    index: Index,
    self_parent: EventHash,
    other_parent: EventHash,
    transactions: Vec<Vec<u8>>,
    timestamp: u64,
}

impl TestEvent {
    pub fn new(hex: impl Into<EventHash>, creator: PubKey, index: Index) -> Self {
        Self {
            hex: hex.into(),
            creator,
            index,
            self_parent: EventHash::empty(),
            other_parent: EventHash::empty(),
            transactions: Vec::new(),
            timestamp: 0,
        }
    }

    pub fn set_self_parent(mut self, h: impl Into<EventHash>) -> Self {
        self.self_parent = h.into();
        self
    }

    pub fn set_other_parent(mut self, h: impl Into<EventHash>) -> Self {
        self.other_parent = h.into();
        self
    }

    pub fn set_transactions(mut self, txs: Vec<Vec<u8>>) -> Self {
        self.transactions = txs;
        self
    }

    pub fn set_timestamp(mut self, ts: u64) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn build(self) -> Event {
        Event {
            hex: self.hex,
            creator: self.creator,
            index: self.index,
            self_parent: self.self_parent,
            other_parent: self.other_parent,
            transactions: self.transactions,
            timestamp: self.timestamp,
            signature: Vec::new(),
            topological_index: -1,
            round_received: None,
            last_ancestors: Vec::new(),
            first_descendants: Vec::new(),
            self_parent_index: None,
            other_parent_creator_id: None,
            other_parent_index: None,
            creator_id: None,
        }
    }
}

impl From<String> for EventHash {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}
