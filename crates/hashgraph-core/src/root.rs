// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::{EventHash, Index, Round};

/// Per-participant synthetic "pre-event" marking the frontier at which the core's
/// knowledge of that participant begins. Events whose self_parent/other_parent point at
/// a root's `x`/`y` are the first events the core has seen from that participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    /// Hash standing in for a virtual self-parent.
    pub x: EventHash,
    /// Hash standing in for a virtual other-parent.
    pub y: EventHash,
    /// Index one less than the participant's first real event.
    pub index: Index,
    pub round: Round,
    /// Other-parents referenced by events rooted just above this root that live outside
    /// the known DAG, keyed by the referencing event's hash.
    pub others: HashMap<EventHash, EventHash>,
}

impl Root {
    pub fn genesis() -> Self {
        Self {
            x: EventHash::empty(),
            y: EventHash::empty(),
            index: -1,
            round: -1,
            others: HashMap::new(),
        }
    }
}
