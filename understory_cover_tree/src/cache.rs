// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A sparse value cache over a bounded index domain.

use alloc::vec::Vec;

/// Call counters of a [`SparseCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups.
    pub gets: usize,
    /// Number of stores.
    pub sets: usize,
}

/// Maps keys in `0..domain` to values, with presence tracking.
///
/// Storage is a sparse set: a dense list of `(key, value)` pairs plus a
/// key-to-position table that is validated against the dense list. Clearing only
/// truncates the dense list, so the cost of a traversal is proportional to the
/// keys it touched rather than to the domain.
#[derive(Clone, Debug, Default)]
pub struct SparseCache<V> {
    positions: Vec<u32>,
    dense: Vec<(u32, V)>,
    stats: CacheStats,
}

impl<V: Copy> SparseCache<V> {
    /// Create a cache for keys in `0..domain`.
    pub fn new(domain: usize) -> Self {
        let mut cache = Self {
            positions: Vec::new(),
            dense: Vec::new(),
            stats: CacheStats::default(),
        };
        cache.set_domain(domain);
        cache
    }

    /// Grow the key domain to `0..domain`. Existing entries are kept.
    pub fn set_domain(&mut self, domain: usize) {
        if self.positions.len() < domain {
            self.positions.resize(domain, u32::MAX);
        }
    }

    /// Size of the key domain.
    pub fn domain(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, key: usize) -> Option<usize> {
        let pos = *self.positions.get(key)? as usize;
        match self.dense.get(pos) {
            Some(&(k, _)) if k as usize == key => Some(pos),
            _ => None,
        }
    }

    /// Look up `key`, counting the call.
    pub fn get(&mut self, key: usize) -> Option<V> {
        self.stats.gets += 1;
        self.peek(key)
    }

    /// Look up `key` without counting the call.
    pub fn peek(&self, key: usize) -> Option<V> {
        self.position(key).map(|pos| self.dense[pos].1)
    }

    /// Whether `key` has a value.
    pub fn contains(&self, key: usize) -> bool {
        self.position(key).is_some()
    }

    /// Store `value` for `key`, counting the call.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "The domain is bounded by the 32-bit node id range."
    )]
    pub fn set(&mut self, key: usize, value: V) {
        debug_assert!(
            key < self.positions.len(),
            "key {key} outside cache domain {}",
            self.positions.len()
        );
        self.stats.sets += 1;
        if let Some(pos) = self.position(key) {
            self.dense[pos].1 = value;
        } else {
            self.positions[key] = self.dense.len() as u32;
            self.dense.push((key as u32, value));
        }
    }

    /// Number of keys that currently have a value.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether no key has a value.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, V)> + '_ {
        self.dense.iter().map(|&(k, v)| (k as usize, v))
    }

    /// Forget all values. The call counters are kept.
    pub fn clear(&mut self) {
        self.dense.clear();
    }

    /// Reset the call counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Call counters since the last [`reset_stats`][Self::reset_stats].
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn set_get_and_counters() {
        let mut cache = SparseCache::<f64>::new(8);
        assert_eq!(cache.get(3), None);
        cache.set(3, 1.5);
        cache.set(6, 2.5);
        assert_eq!(cache.get(3), Some(1.5));
        assert_eq!(cache.get(6), Some(2.5));
        assert_eq!(cache.get(5), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats(), CacheStats { gets: 4, sets: 2 });
    }

    #[test]
    fn overwrite_keeps_one_entry() {
        let mut cache = SparseCache::<u32>::new(4);
        cache.set(1, 10);
        cache.set(1, 11);
        assert_eq!(cache.peek(1), Some(11));
        assert_eq!(cache.len(), 1, "overwriting must not add an entry");
    }

    #[test]
    fn clear_invalidates_stale_positions() {
        let mut cache = SparseCache::<u32>::new(4);
        cache.set(2, 7);
        cache.clear();
        assert!(!cache.contains(2), "cleared keys must be absent");

        // Key 0 takes dense slot 0, which key 2 still points at.
        cache.set(0, 9);
        assert!(!cache.contains(2), "a reused dense slot must not revive key 2");
        assert_eq!(cache.iter().collect::<Vec<_>>(), vec![(0, 9)]);
        assert_eq!(cache.stats().sets, 2, "clear keeps the counters");
    }

    #[test]
    fn domain_grows_on_demand() {
        let mut cache = SparseCache::<u8>::new(1);
        cache.set_domain(3);
        assert_eq!(cache.domain(), 3);
        cache.set(2, 1);
        assert_eq!(cache.peek(2), Some(1));
        cache.reset_stats();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
