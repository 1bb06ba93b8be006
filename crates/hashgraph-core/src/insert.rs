// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! `InsertEvent` and `ReadWireInfo`: signature check, parent validity, topological
//! indexing, coordinate initialization, store, descendant back-propagation, bookkeeping.

use hashgraph_config::ParticipantId;
use tracing::{debug, instrument, warn};

use crate::coord::{init_first_descendants, init_last_ancestors, stamp_self_slot};
use crate::error::{ConsensusError, ConsensusResult};
use crate::event::{Event, EventHash, WireEvent};
use crate::hashgraph::Hashgraph;
use crate::root::Root;

impl Hashgraph {
    /// Runs the full insertion pipeline described in the module doc comment. On any error
    /// no state is mutated: no topological index is consumed, nothing is written to the
    /// store or caches.
    #[instrument(level = "debug", skip(self, ev), fields(creator = %ev.creator, index = ev.index))]
    pub fn insert_event(&self, ev: Event, set_wire_info: bool) -> ConsensusResult<EventHash> {
        self.try_insert_event(ev, set_wire_info).map_err(|e| {
            self.context
                .metrics
                .insert_errors
                .with_label_values(&[e.metric_label()])
                .inc();
            e
        })
    }

    fn try_insert_event(&self, mut ev: Event, set_wire_info: bool) -> ConsensusResult<EventHash> {
        if !self.verifier.verify(&ev) {
            warn!(hex = %ev.hex, "event failed signature verification");
            return Err(ConsensusError::InvalidSignature(ev.hex));
        }

        let last = self
            .store
            .last_from(&ev.creator)
            .map_err(|e| ConsensusError::StoreError(e.to_string()))?;
        let expected_self_parent = last.as_ref().map(|(hash, _)| hash.clone());
        let last_is_root_marker = last.as_ref().map(|(_, is_root)| *is_root).unwrap_or(true);
        let expected = match &expected_self_parent {
            Some(h) => h.clone(),
            None => EventHash::empty(),
        };
        if ev.self_parent != expected {
            return Err(ConsensusError::SelfParentMismatch {
                given: ev.self_parent,
                expected: expected_self_parent,
            });
        }

        let root = self
            .store
            .get_root(&ev.creator)
            .map_err(|e| ConsensusError::StoreError(e.to_string()))?
            .unwrap_or_else(Root::genesis);

        let other_parent_event = if ev.other_parent.is_empty() {
            None
        } else {
            self.store
                .get_event(&ev.other_parent)
                .map_err(|e| ConsensusError::StoreError(e.to_string()))?
        };

        if !ev.other_parent.is_empty() && other_parent_event.is_none() {
            let sits_on_root = root.x == ev.self_parent && root.y == ev.other_parent;
            let accounted_for = root.others.get(&ev.hex) == Some(&ev.other_parent);
            if !sits_on_root && !accounted_for {
                return Err(ConsensusError::OtherParentUnknown(ev.other_parent));
            }
        }

        let self_parent_event = if ev.self_parent.is_empty() || last_is_root_marker {
            None
        } else {
            self.store
                .get_event(&ev.self_parent)
                .map_err(|e| ConsensusError::StoreError(e.to_string()))?
        };

        let topological_index = {
            let mut counters = self.counters.write();
            let idx = counters.topological_index;
            counters.topological_index += 1;
            idx
        };
        ev.topological_index = topological_index;

        if set_wire_info {
            self.populate_wire_info(&mut ev, self_parent_event.as_ref(), other_parent_event.as_ref(), &root);
        }

        let n = self.context.participants.len();
        let mut last_ancestors = init_last_ancestors(n, self_parent_event.as_ref(), other_parent_event.as_ref());
        let mut first_descendants = init_first_descendants(n);
        let creator_id = self
            .context
            .participants
            .id_of(&ev.creator)
            .ok_or_else(|| ConsensusError::Config(hashgraph_config::ConfigError::UnknownPubKey(ev.creator.clone())))?;
        stamp_self_slot(
            &mut last_ancestors,
            &mut first_descendants,
            creator_id.value() as usize,
            ev.index,
            &ev.hex,
        );
        ev.last_ancestors = last_ancestors;
        ev.first_descendants = first_descendants;

        let hex = ev.hex.clone();
        let is_loaded = ev.is_loaded();

        self.store
            .set_event(ev.clone())
            .map_err(|e| ConsensusError::StoreError(e.to_string()))?;

        self.back_propagate_first_descendants(&ev, creator_id)?;

        self.undetermined_events.write().push(hex.clone());
        if is_loaded {
            self.counters.write().pending_loaded_events += 1;
        }
        self.context.metrics.events_inserted.inc();
        debug!(hex = %hex, topological_index, "event inserted");

        Ok(hex)
    }

    fn populate_wire_info(
        &self,
        ev: &mut Event,
        self_parent: Option<&Event>,
        other_parent: Option<&Event>,
        root: &Root,
    ) {
        ev.creator_id = self.context.participants.id_of(&ev.creator);
        ev.self_parent_index = self_parent.map(|e| e.index).or(if ev.self_parent == root.x {
            Some(root.index)
        } else {
            None
        });
        match other_parent {
            Some(op) => {
                ev.other_parent_creator_id = self.context.participants.id_of(&op.creator);
                ev.other_parent_index = Some(op.index);
            }
            None if ev.other_parent == root.y => {
                // The root carries no record of the virtual other-parent's original
                // creator, so the wire form cannot name one here.
                ev.other_parent_creator_id = None;
                ev.other_parent_index = Some(root.index);
            }
            None => {
                ev.other_parent_creator_id = None;
                ev.other_parent_index = None;
            }
        }
    }

    /// Walks each ancestry slot backwards along self-parent edges, stamping the newly
    /// inserted event as the earliest known descendant from its creator, and stopping as
    /// soon as an ancestor already carries that information (everything further back is
    /// covered by monotonicity).
    fn back_propagate_first_descendants(
        &self,
        ev: &Event,
        creator_id: ParticipantId,
    ) -> ConsensusResult<()> {
        for entry in &ev.last_ancestors {
            if entry.hash.is_empty() {
                continue;
            }
            let mut cursor = entry.hash.clone();
            loop {
                let Some(mut ancestor) = self
                    .store
                    .get_event(&cursor)
                    .map_err(|e| ConsensusError::StoreError(e.to_string()))?
                else {
                    break;
                };
                let slot = creator_id.value() as usize;
                match ancestor.first_descendants.get(slot) {
                    Some(fd) if fd.index != crate::event::UNSET_DESCENDANT_INDEX => break,
                    None => break,
                    _ => {}
                }
                ancestor.first_descendants[slot] = crate::event::CoordEntry {
                    index: ev.index,
                    hash: ev.hex.clone(),
                };
                let next_cursor = ancestor.self_parent.clone();
                self.store
                    .set_event(ancestor)
                    .map_err(|e| ConsensusError::StoreError(e.to_string()))?;
                if next_cursor.is_empty() {
                    break;
                }
                cursor = next_cursor;
            }
        }
        Ok(())
    }

    /// Reconstructs a full `Event` from its wire form against the current store. Performs
    /// no validation; callers still run it through `insert_event` to enforce invariants.
    pub fn read_wire_info(&self, wev: WireEvent) -> ConsensusResult<Event> {
        let creator = match wev.creator_id {
            Some(id) => self
                .context
                .participants
                .pubkey_of(id)
                .cloned()
                .ok_or(ConsensusError::UnknownParticipant(id))?,
            None => wev.creator.clone(),
        };

        let self_parent = match wev.self_parent_index {
            Some(idx) if idx >= 0 => self
                .store
                .participant_event(&creator, idx)
                .map_err(|e| ConsensusError::StoreError(e.to_string()))?
                .unwrap_or_else(EventHash::empty),
            _ => EventHash::empty(),
        };

        let other_parent = match (wev.other_parent_creator_id, wev.other_parent_index) {
            (Some(opc_id), Some(idx)) if idx >= 0 => {
                let opc = self
                    .context
                    .participants
                    .pubkey_of(opc_id)
                    .cloned()
                    .ok_or(ConsensusError::UnknownParticipant(opc_id))?;
                self.store
                    .participant_event(&opc, idx)
                    .map_err(|e| ConsensusError::StoreError(e.to_string()))?
                    .unwrap_or_else(EventHash::empty)
            }
            _ => EventHash::empty(),
        };

        Ok(Event {
            hex: EventHash::empty(),
            creator,
            index: wev.index,
            self_parent,
            other_parent,
            transactions: wev.transactions,
            timestamp: wev.timestamp,
            signature: wev.signature,
            topological_index: -1,
            round_received: None,
            last_ancestors: Vec::new(),
            first_descendants: Vec::new(),
            self_parent_index: wev.self_parent_index,
            other_parent_creator_id: wev.other_parent_creator_id,
            other_parent_index: wev.other_parent_index,
            creator_id: wev.creator_id,
        })
    }
}
