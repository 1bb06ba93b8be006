// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bounded LRU memoization for the predicate and round engines. All caches share a single
//! configured capacity (`store.cache_size()`), as specified.
//!
//! Discipline enforced here and by callers in `predicate.rs`/`round.rs`: a result is only
//! ever inserted once it was computed from fully-resolved events. A lookup that bottoms
//! out because some event is absent from the store must never be memoized, since the
//! DAG only grows — a "false"/`-1` answer produced today because an event hadn't arrived
//! yet would otherwise outlive the event's eventual insertion.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::event::EventHash;
use crate::round::{ParentRoundInfo, Round};

fn key1(x: &EventHash) -> String {
    x.to_string()
}

fn key2(x: &EventHash, y: &EventHash) -> String {
    format!("{x}|{y}")
}

struct BoundedCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: std::hash::Hash + Eq, V: Clone> BoundedCache<K, V> {
    fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }
}

/// The full set of memoization tables the predicate/round engines consult.
pub struct Caches {
    ancestor: BoundedCache<String, bool>,
    self_ancestor: BoundedCache<String, bool>,
    strongly_see: BoundedCache<String, bool>,
    /// Empty hash represents "no oldest self-ancestor found".
    oldest_self_ancestor_to_see: BoundedCache<String, EventHash>,
    parent_round: BoundedCache<String, ParentRoundInfo>,
    round: BoundedCache<String, Round>,
}

impl Caches {
    pub fn new(capacity: usize) -> Self {
        Self {
            ancestor: BoundedCache::new(capacity),
            self_ancestor: BoundedCache::new(capacity),
            strongly_see: BoundedCache::new(capacity),
            oldest_self_ancestor_to_see: BoundedCache::new(capacity),
            parent_round: BoundedCache::new(capacity),
            round: BoundedCache::new(capacity),
        }
    }

    pub fn get_ancestor(&self, x: &EventHash, y: &EventHash) -> Option<bool> {
        self.ancestor.get(&key2(x, y))
    }
    pub fn put_ancestor(&self, x: &EventHash, y: &EventHash, v: bool) {
        self.ancestor.put(key2(x, y), v);
    }

    pub fn get_self_ancestor(&self, x: &EventHash, y: &EventHash) -> Option<bool> {
        self.self_ancestor.get(&key2(x, y))
    }
    pub fn put_self_ancestor(&self, x: &EventHash, y: &EventHash, v: bool) {
        self.self_ancestor.put(key2(x, y), v);
    }

    pub fn get_strongly_see(&self, x: &EventHash, y: &EventHash) -> Option<bool> {
        self.strongly_see.get(&key2(x, y))
    }
    pub fn put_strongly_see(&self, x: &EventHash, y: &EventHash, v: bool) {
        self.strongly_see.put(key2(x, y), v);
    }

    pub fn get_oldest_self_ancestor_to_see(
        &self,
        x: &EventHash,
        y: &EventHash,
    ) -> Option<EventHash> {
        self.oldest_self_ancestor_to_see.get(&key2(x, y))
    }
    pub fn put_oldest_self_ancestor_to_see(&self, x: &EventHash, y: &EventHash, v: EventHash) {
        self.oldest_self_ancestor_to_see.put(key2(x, y), v);
    }

    pub fn get_parent_round(&self, x: &EventHash) -> Option<ParentRoundInfo> {
        self.parent_round.get(&key1(x))
    }
    pub fn put_parent_round(&self, x: &EventHash, v: ParentRoundInfo) {
        self.parent_round.put(key1(x), v);
    }

    pub fn get_round(&self, x: &EventHash) -> Option<Round> {
        self.round.get(&key1(x))
    }
    pub fn put_round(&self, x: &EventHash, v: Round) {
        self.round.put(key1(x), v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let caches = Caches::new(2);
        let a = EventHash::from("a");
        let b = EventHash::from("b");
        let c = EventHash::from("c");

        caches.put_ancestor(&a, &a, true);
        caches.put_ancestor(&b, &b, true);
        // touch a so it's more recently used than b
        assert_eq!(caches.get_ancestor(&a, &a), Some(true));
        caches.put_ancestor(&c, &c, true);

        // b should have been evicted, a and c remain
        assert_eq!(caches.get_ancestor(&b, &b), None);
        assert_eq!(caches.get_ancestor(&a, &a), Some(true));
        assert_eq!(caches.get_ancestor(&c, &c), Some(true));
    }

    #[test]
    fn hit_is_indistinguishable_from_recompute() {
        let caches = Caches::new(8);
        let x = EventHash::from("x");
        let y = EventHash::from("y");
        assert_eq!(caches.get_strongly_see(&x, &y), None);
        caches.put_strongly_see(&x, &y, true);
        assert_eq!(caches.get_strongly_see(&x, &y), Some(true));
    }
}
