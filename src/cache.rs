use std::cell::Cell;

use crate::utils::{pairing2, pairing3, MyHash};

/// Key for memoized set operations.
///
/// Binary operations record the ids of their arguments in `(min_id, max_id)`
/// order together with the requested order limit, so that symmetric calls hit
/// the same slot. Subsume is not symmetric and keys `(high_id, low_id)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpKey {
    Or(u64, u64, i32),
    And(u64, u64, i32),
    Subsume(u64, u64),
}

impl MyHash for OpKey {
    fn hash(&self) -> u64 {
        match *self {
            OpKey::Or(a, b, k) => pairing2(1, pairing3(a, b, k as u64)),
            OpKey::And(a, b, k) => pairing2(2, pairing3(a, b, k as u64)),
            OpKey::Subsume(a, b) => pairing2(3, pairing2(a, b)),
        }
    }
}

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Direct-mapped cache of size `2^bits` with single-entry slots.
///
/// Collisions overwrite; a lookup only reports a hit when the stored key
/// matches exactly, so the cache is safe for memoization of pure operations.
pub struct Cache<K, V> {
    data: Vec<Option<Entry<K, V>>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V> {
    /// Create a new table of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1 << bits;
        let bitmask = (size - 1) as u64;

        Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Reset the cache.
    pub fn clear(&mut self) {
        self.data.fill_with(|| None);
    }
}

impl<K, V> Cache<K, V>
where
    K: MyHash,
{
    fn index(&self, key: &K) -> usize {
        (key.hash() & self.bitmask) as usize
    }

    /// Get the cached result.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: Eq,
    {
        let index = self.index(key);
        match &self.data[index] {
            Some(entry) if &entry.key == key => {
                self.hits.set(self.hits.get() + 1);
                Some(&entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result into the cache.
    pub fn insert(&mut self, key: K, value: V) {
        let index = self.index(&key);
        self.data[index] = Some(Entry { key, value });
    }
}
