// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use hashgraph_config::ParticipantRegistry;
use prometheus::Registry;

use crate::metrics::Metrics;

/// Static, immutable-for-the-instance configuration a `Hashgraph` is built from, mirroring
/// the teacher's `Context { committee, parameters, metrics, .. }`.
pub struct Context {
    pub participants: ParticipantRegistry,
    pub cache_size: usize,
    pub metrics: Metrics,
}

impl Context {
    pub fn new(participants: ParticipantRegistry, cache_size: usize, registry: &Registry) -> Self {
        Self {
            participants,
            cache_size,
            metrics: Metrics::new(registry),
        }
    }

    pub fn super_majority(&self) -> usize {
        self.participants.super_majority()
    }
}
