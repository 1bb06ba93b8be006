// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Observational metrics for a `Hashgraph` instance. Never consulted by the algorithms
//! themselves — purely for operators, mirroring the teacher's `Context { metrics, .. }`.

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub struct Metrics {
    pub events_inserted: IntCounter,
    pub insert_errors: IntCounterVec,
    pub cache_hits: IntCounterVec,
    pub cache_misses: IntCounterVec,
    pub current_round: IntGauge,
}

impl Metrics {
    pub fn new(registry: &Registry) -> Self {
        let events_inserted = IntCounter::new(
            "hashgraph_events_inserted_total",
            "Number of events successfully inserted",
        )
        .unwrap();
        let insert_errors = IntCounterVec::new(
            Opts::new(
                "hashgraph_insert_errors_total",
                "Number of events rejected by the insertion pipeline, by error kind",
            ),
            &["kind"],
        )
        .unwrap();
        let cache_hits = IntCounterVec::new(
            Opts::new("hashgraph_cache_hits_total", "Memoization cache hits by predicate"),
            &["predicate"],
        )
        .unwrap();
        let cache_misses = IntCounterVec::new(
            Opts::new(
                "hashgraph_cache_misses_total",
                "Memoization cache misses by predicate",
            ),
            &["predicate"],
        )
        .unwrap();
        let current_round = IntGauge::new(
            "hashgraph_current_round",
            "Highest round observed across all known events",
        )
        .unwrap();

        for c in [
            registry.register(Box::new(events_inserted.clone())),
            registry.register(Box::new(insert_errors.clone())),
            registry.register(Box::new(cache_hits.clone())),
            registry.register(Box::new(cache_misses.clone())),
            registry.register(Box::new(current_round.clone())),
        ] {
            // Registration can only fail on duplicate metric names within one registry;
            // callers are expected to pass a fresh registry per instance, as the teacher
            // engine does per-node.
            let _ = c;
        }

        Self {
            events_inserted,
            insert_errors,
            cache_hits,
            cache_misses,
            current_round,
        }
    }

    pub fn record_cache(&self, predicate: &str, hit: bool) {
        if hit {
            self.cache_hits.with_label_values(&[predicate]).inc();
        } else {
            self.cache_misses.with_label_values(&[predicate]).inc();
        }
    }
}
