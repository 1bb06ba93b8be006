// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::event::Event;

/// Signature verification boundary. Definition of the cryptography itself is out of
/// scope for this crate; the core only requires that `verify` be deterministic.
pub trait Verifier: Send + Sync {
    fn verify(&self, event: &Event) -> bool;
}

/// Always-true verifier for tests, mirroring the teacher's `NoopBlockVerifier`.
pub struct NoopVerifier;

impl Verifier for NoopVerifier {
    fn verify(&self, _event: &Event) -> bool {
        true
    }
}
