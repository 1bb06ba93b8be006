// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use hashgraph_config::{ConfigError, ParticipantId};
use thiserror::Error;

use crate::event::EventHash;

pub type ConsensusResult<T> = Result<T, ConsensusError>;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("event {0} failed signature verification")]
    InvalidSignature(EventHash),

    #[error("event self_parent {given} does not match creator's last known event {expected:?}")]
    SelfParentMismatch {
        given: EventHash,
        expected: Option<EventHash>,
    },

    #[error("event other_parent {0} is neither stored nor accounted for by its creator's root")]
    OtherParentUnknown(EventHash),

    #[error("round_diff encountered an unresolved round for event {0}")]
    NegativeRound(EventHash),

    #[error("participant {0} not found in registry")]
    UnknownParticipant(ParticipantId),

    #[error("store error: {0}")]
    StoreError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConsensusError {
    /// Stable, low-cardinality label for the `hashgraph_insert_errors_total` metric.
    pub fn metric_label(&self) -> &'static str {
        match self {
            ConsensusError::InvalidSignature(_) => "invalid_signature",
            ConsensusError::SelfParentMismatch { .. } => "self_parent_mismatch",
            ConsensusError::OtherParentUnknown(_) => "other_parent_unknown",
            ConsensusError::NegativeRound(_) => "negative_round",
            ConsensusError::UnknownParticipant(_) => "unknown_participant",
            ConsensusError::StoreError(_) => "store_error",
            ConsensusError::Config(_) => "config",
        }
    }
}
