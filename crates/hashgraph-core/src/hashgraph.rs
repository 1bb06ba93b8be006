// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use crate::cache::Caches;
use crate::context::Context;
use crate::event::{Event, EventHash, Index, Round};
use crate::store::Store;
use crate::verifier::Verifier;

/// Per-instance counters the writer task owns exclusively. Grouped behind one lock so
/// `InsertEvent` updates them atomically with respect to readers.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) topological_index: Index,
    pub(crate) pending_loaded_events: u64,
    // Reserved for the out-of-scope ordering pass; the core only declares and updates
    // these where explicitly specified (never), but keeps them addressable so a
    // downstream fame/ordering implementation has somewhere to write.
    pub(crate) last_consensus_round: Option<Round>,
    pub(crate) last_committed_round_events: u64,
    pub(crate) consensus_transactions: u64,
}

/// The Hashgraph core: a single-writer, multi-reader DAG of signed events over a fixed
/// participant set, with the predicate/round engines and their caches attached.
pub struct Hashgraph {
    pub(crate) context: Arc<Context>,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) verifier: Arc<dyn Verifier>,
    pub(crate) caches: Caches,
    pub(crate) commit_sink: UnboundedSender<Vec<Event>>,

    pub(crate) counters: RwLock<Counters>,
    /// Ordered, append-only sequence of event hashes inserted but not yet carried through
    /// the (out-of-scope) fame/ordering pass.
    pub(crate) undetermined_events: RwLock<Vec<EventHash>>,
}

impl Hashgraph {
    pub fn new(
        context: Arc<Context>,
        store: Arc<dyn Store>,
        verifier: Arc<dyn Verifier>,
        commit_sink: UnboundedSender<Vec<Event>>,
    ) -> Self {
        let caches = Caches::new(context.cache_size);
        Self {
            context,
            store,
            verifier,
            caches,
            commit_sink,
            counters: RwLock::new(Counters::default()),
            undetermined_events: RwLock::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn pending_loaded_events(&self) -> u64 {
        self.counters.read().pending_loaded_events
    }

    pub fn next_topological_index(&self) -> Index {
        self.counters.read().topological_index
    }

    pub fn undetermined_events(&self) -> Vec<EventHash> {
        self.undetermined_events.read().clone()
    }
}
