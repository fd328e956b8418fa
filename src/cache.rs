//! Bounded least-recently-used cache for scale-note lookups.

use std::collections::HashMap;

use serde::Serialize;

use crate::key::Key;
use crate::pitch::PitchClass;

/// Default number of `"{root}:{mode}"` entries kept.
pub const DEFAULT_SCALE_CACHE_CAPACITY: usize = 100;

#[derive(Debug)]
struct Entry {
    notes: Vec<PitchClass>,
    last_used: u64,
}

/// Occupancy and hit counts of a [`ScaleCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Access-ordered LRU of `"{root}:{mode}" -> scale notes`.
///
/// Owned by a [`crate::KeyDetector`]; independent detectors never share one.
#[derive(Debug)]
pub struct ScaleCache {
    capacity: usize,
    clock: u64,
    entries: HashMap<String, Entry>,
    hits: u64,
    misses: u64,
}

impl ScaleCache {
    /// Empty cache holding at most `capacity` scales (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            clock: 0,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Scale notes for `key`, computing and inserting them on a miss.
    pub fn scale_notes(&mut self, key: Key) -> Vec<PitchClass> {
        self.clock += 1;
        let id = key.scale_id();

        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_used = self.clock;
            self.hits += 1;
            return entry.notes.clone();
        }

        self.misses += 1;
        if self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }
        let notes = key.scale_notes();
        self.entries.insert(
            id,
            Entry {
                notes: notes.clone(),
                last_used: self.clock,
            },
        );
        notes
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(k) = oldest {
            log::trace!("scale cache evicting {k}");
            self.entries.remove(&k);
        }
    }

    /// Current occupancy, plus hits and misses since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }

    #[cfg(test)]
    fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key.scale_id())
    }
}

impl Default for ScaleCache {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyMode;

    fn key(pc: u8, mode: KeyMode) -> Key {
        Key::new(PitchClass(pc), mode)
    }

    #[test]
    fn caches_by_root_and_mode() {
        let mut cache = ScaleCache::new(4);
        let a = cache.scale_notes(key(0, KeyMode::Major));
        let b = cache.scale_notes(key(0, KeyMode::Major));
        assert_eq!(a, b);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));

        cache.scale_notes(key(0, KeyMode::Minor));
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn evicts_least_recently_used_not_oldest_inserted() {
        let mut cache = ScaleCache::new(2);
        let c = key(0, KeyMode::Major);
        let g = key(7, KeyMode::Major);
        let d = key(2, KeyMode::Major);

        cache.scale_notes(c);
        cache.scale_notes(g);
        // Touch C so G becomes the least recently used.
        cache.scale_notes(c);
        cache.scale_notes(d);

        assert!(cache.contains(c));
        assert!(!cache.contains(g));
        assert!(cache.contains(d));
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut cache = ScaleCache::default();
        for pc in 0..12 {
            for mode in [KeyMode::Major, KeyMode::Minor] {
                for _ in 0..3 {
                    cache.scale_notes(key(pc, mode));
                }
            }
        }
        let stats = cache.stats();
        assert_eq!(stats.entries, 24);
        assert_eq!(stats.capacity, DEFAULT_SCALE_CACHE_CAPACITY);
        assert_eq!(stats.misses, 24);
        assert_eq!(stats.hits, 48);

        let mut tiny = ScaleCache::new(0);
        tiny.scale_notes(key(0, KeyMode::Major));
        tiny.scale_notes(key(1, KeyMode::Major));
        assert_eq!(tiny.stats().entries, 1);
        assert_eq!(tiny.stats().capacity, 1);
    }
}
