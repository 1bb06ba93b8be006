// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Participant identity and registry types shared between the hashgraph core and any
//! downstream node binary. Kept separate from `hashgraph-core` so that configuration data
//! can be constructed and passed around without pulling in the algorithmic core.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dense, zero-based index of a participant. Used to index coordinate vectors directly
/// instead of hashing a pubkey on every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque participant public key. The core never interprets these bytes; it only uses
/// them as a lookup key into the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PubKey(pub Vec<u8>);

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate participant pubkey registered: {0}")]
    DuplicatePubKey(PubKey),
    #[error("unknown participant pubkey: {0}")]
    UnknownPubKey(PubKey),
    #[error("unknown participant id: {0}")]
    UnknownParticipantId(ParticipantId),
    #[error("participant registry must contain at least one participant")]
    EmptyRegistry,
}

/// Fixed, bijective mapping between participant public keys and dense ids, plus the
/// derived super-majority threshold. Immutable for the lifetime of a `Hashgraph` instance.
#[derive(Debug, Clone)]
pub struct ParticipantRegistry {
    by_pubkey: BTreeMap<PubKey, ParticipantId>,
    by_id: Vec<PubKey>,
}

impl ParticipantRegistry {
    /// Builds a registry from an ordered list of pubkeys. The position in `pubkeys`
    /// becomes the participant's dense id.
    pub fn new(pubkeys: Vec<PubKey>) -> Result<Self, ConfigError> {
        if pubkeys.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }
        let mut by_pubkey = BTreeMap::new();
        for (idx, pk) in pubkeys.iter().enumerate() {
            if by_pubkey
                .insert(pk.clone(), ParticipantId(idx as u32))
                .is_some()
            {
                return Err(ConfigError::DuplicatePubKey(pk.clone()));
            }
        }
        Ok(Self {
            by_pubkey,
            by_id: pubkeys,
        })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn id_of(&self, pubkey: &PubKey) -> Option<ParticipantId> {
        self.by_pubkey.get(pubkey).copied()
    }

    pub fn pubkey_of(&self, id: ParticipantId) -> Option<&PubKey> {
        self.by_id.get(id.0 as usize)
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> {
        (0..self.by_id.len() as u32).map(ParticipantId)
    }

    /// `2N/3 + 1`, integer division. The minimum count of participant slots a quorum
    /// predicate (strongly-see, round-inc) must cover.
    pub fn super_majority(&self) -> usize {
        2 * self.len() / 3 + 1
    }
}
