//! A separate-chaining hash map with power-of-two capacity and
//! load-factor-driven growth.
//!
//! Each bucket owns the head of a singly linked chain of [`Entry`] boxes; new
//! entries are prepended, so a bucket lists its most recent insertions first.
//! A supplemental bit-mixing step spreads raw hash codes across bits before
//! they are truncated to a bucket index, which keeps expected chain lengths
//! bounded even for low-entropy hash functions.
//!
//! The absent key is modeled as `Option<K>`: `None` is a legal key, always
//! lives in bucket 0, and occurs at most once.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::MapError;
use crate::map::{AssocMap, EntrySeq};

/// Bucket count used by [`ChainedHashMap::new`] and after [`ChainedHashMap::clear`].
/// Must be a power of two.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Largest permitted bucket count. Once reached, the table stops growing.
pub const MAXIMUM_CAPACITY: usize = 1 << 30;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// One link of a bucket's collision chain: a key, its value, and exclusive
/// ownership of the rest of the chain.
pub struct Entry<K, V> {
    key: Option<K>,
    value: V,
    next: Option<Box<Entry<K, V>>>,
}

/// Clones the entry and every entry after it in its chain. Iterative for the
/// same reason teardown is: a degenerate chain must not recurse per entry.
impl<K: Clone, V: Clone> Clone for Entry<K, V> {
    fn clone(&self) -> Self {
        let mut head = Entry {
            key: self.key.clone(),
            value: self.value.clone(),
            next: None,
        };
        let mut dst = &mut head.next;
        let mut src = self.next.as_deref();
        while let Some(entry) = src {
            dst = &mut dst
                .insert(Box::new(Entry {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    next: None,
                }))
                .next;
            src = entry.next.as_deref();
        }
        head
    }
}

impl<K, V> Entry<K, V> {
    /// The entry's key; `None` is the absent key.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// The entry's current value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The next entry in the same bucket, if any.
    pub fn next(&self) -> Option<&Entry<K, V>> {
        self.next.as_deref()
    }
}

/// Entries compare by key and value; the chain link is ignored.
impl<K: PartialEq, V: PartialEq> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// A hash map with separate chaining and amortized-doubling growth.
///
/// Capacity is always a power of two in `1 ..= 2^30`; the table doubles when
/// the mapping count reaches `capacity * load_factor` and never shrinks.
///
/// # Example
///
/// ```rust
/// use mapkit::ChainedHashMap;
///
/// let mut map: ChainedHashMap<&str, u32> = ChainedHashMap::new();
/// map.put(Some("a"), 5);
/// map.put(None, 9);
/// assert_eq!(map.get(Some(&"a")), Some(&5));
/// assert_eq!(map.get(None), Some(&9));
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct ChainedHashMap<K, V> {
    table: Vec<Option<Box<Entry<K, V>>>>,
    size: usize,
    threshold: usize,
    load_factor: f32,
}

impl<K: Hash + Eq, V> ChainedHashMap<K, V> {
    /// Creates an empty map with the default capacity (16) and load factor
    /// (0.75).
    pub fn new() -> Self {
        Self::with_capacity_and_load_factor(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR)
            .expect("default construction parameters are valid")
    }

    /// Creates an empty map with the given initial capacity and the default
    /// load factor (0.75).
    pub fn with_capacity(initial_capacity: usize) -> Result<Self, MapError> {
        Self::with_capacity_and_load_factor(initial_capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map with the given initial capacity and load factor.
    ///
    /// The capacity is rounded up to the next power of two and clamped to
    /// [`MAXIMUM_CAPACITY`].
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCapacity`] for a zero capacity;
    /// [`MapError::InvalidLoadFactor`] for a non-positive or NaN load factor.
    pub fn with_capacity_and_load_factor(
        initial_capacity: usize,
        load_factor: f32,
    ) -> Result<Self, MapError> {
        if initial_capacity == 0 {
            return Err(MapError::InvalidCapacity(initial_capacity));
        }
        if load_factor <= 0.0 || load_factor.is_nan() {
            return Err(MapError::InvalidLoadFactor(load_factor));
        }

        let capacity = initial_capacity
            .min(MAXIMUM_CAPACITY)
            .next_power_of_two();

        Ok(Self {
            table: Self::alloc_table(capacity),
            size: 0,
            threshold: Self::threshold_for(capacity, load_factor),
            load_factor,
        })
    }

    /// Number of key-value mappings.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when the map holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current bucket count. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// The load factor fixed at construction.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// The live bucket array, for external inspection of the map's internal
    /// structure. Heads of non-empty chains are walked via [`Entry::next`].
    ///
    /// This is the actual table, not a snapshot; re-borrow after mutating to
    /// observe structural changes such as a resize.
    pub fn table(&self) -> &[Option<Box<Entry<K, V>>>] {
        &self.table
    }

    /// Returns the value mapped to `key`, or `None` if there is no mapping.
    ///
    /// `None` matches only the absent key; it never collides with a present
    /// key that hashes to bucket 0.
    pub fn get(&self, key: Option<&K>) -> Option<&V> {
        let mut cur = self.table[self.bucket_of(key)].as_deref();
        while let Some(entry) = cur {
            if entry.key.as_ref() == key {
                return Some(&entry.value);
            }
            cur = entry.next.as_deref();
        }
        None
    }

    /// True when a mapping for `key` exists.
    pub fn contains_key(&self, key: Option<&K>) -> bool {
        self.get(key).is_some()
    }

    /// True when some key maps to `value`. Traverses every chain; stops at
    /// the first match. O(capacity + len).
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Maps `key` to `value`, returning the previously mapped value if any.
    ///
    /// A matching key has its value replaced in place; otherwise a fresh
    /// entry is prepended to its bucket's chain. When the insertion brings
    /// the mapping count up to the growth threshold, the table doubles.
    pub fn put(&mut self, key: Option<K>, value: V) -> Option<V> {
        let idx = self.bucket_of(key.as_ref());

        let mut cur = self.table[idx].as_deref_mut();
        while let Some(entry) = cur {
            if entry.key == key {
                return Some(std::mem::replace(&mut entry.value, value));
            }
            cur = entry.next.as_deref_mut();
        }

        let next = self.table[idx].take();
        self.table[idx] = Some(Box::new(Entry { key, value, next }));
        self.size += 1;
        if self.size >= self.threshold {
            self.grow();
        }
        None
    }

    /// Removes the mapping for `key`, returning its value if one existed.
    pub fn remove(&mut self, key: Option<&K>) -> Option<V> {
        let idx = self.bucket_of(key);
        let mut link = &mut self.table[idx];
        while link.is_some() {
            let hit = link
                .as_deref()
                .map_or(false, |entry| entry.key.as_ref() == key);
            if hit {
                let mut entry = link.take().expect("hit implies a live entry");
                *link = entry.next.take();
                self.size -= 1;
                return Some(entry.value);
            }
            link = &mut link.as_mut().expect("link checked non-empty").next;
        }
        None
    }

    /// Removes all mappings by swapping in a fresh table of the default
    /// capacity. O(1) amortized over the discarded entries.
    pub fn clear(&mut self) {
        let mut old = std::mem::replace(
            &mut self.table,
            Self::alloc_table(DEFAULT_INITIAL_CAPACITY),
        );
        Self::dismantle(&mut old);
        self.size = 0;
        self.threshold = Self::threshold_for(DEFAULT_INITIAL_CAPACITY, self.load_factor);
    }

    /// A lazy iteration over all entries: bucket index ascending, chain
    /// head-to-tail within a bucket. Not restartable; call again for a fresh
    /// pass.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.table,
            index: 0,
            cur: self.table.first().and_then(|slot| slot.as_deref()),
        }
    }

    /// Bucket index dictated by the supplemental hash under the current
    /// capacity. The absent key always resolves to bucket 0.
    pub(crate) fn bucket_of(&self, key: Option<&K>) -> usize {
        Self::index_for(key, self.table.len())
    }

    fn index_for(key: Option<&K>, length: usize) -> usize {
        match key {
            Some(k) => Self::spread(Self::raw_hash(k)) as usize & (length - 1),
            None => 0,
        }
    }

    fn raw_hash(key: &K) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Supplemental hash: XOR the code with its own right-shifts by 20 and
    /// 12, then with right-shifts by 7 and 4. Spreads entropy into the low
    /// bits so that masking with `capacity - 1` does not pile colliding keys
    /// into a few buckets.
    fn spread(mut h: u64) -> u64 {
        h ^= (h >> 20) ^ (h >> 12);
        h ^ (h >> 7) ^ (h >> 4)
    }

    fn threshold_for(capacity: usize, load_factor: f32) -> usize {
        (capacity as f32 * load_factor) as usize
    }

    fn alloc_table(capacity: usize) -> Vec<Option<Box<Entry<K, V>>>> {
        std::iter::repeat_with(|| None).take(capacity).collect()
    }

    /// Doubles the table, or freezes growth at [`MAXIMUM_CAPACITY`] by
    /// pushing the threshold out of reach.
    fn grow(&mut self) {
        let capacity = self.table.len();
        if capacity >= MAXIMUM_CAPACITY {
            self.threshold = usize::MAX;
            return;
        }
        self.resize(capacity * 2);
    }

    /// Rehashes every entry into a table of `new_capacity` buckets, walking
    /// the old table from bucket 0 upward and each chain head-to-tail,
    /// prepending into the destination buckets as `put` would.
    fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two() && new_capacity <= MAXIMUM_CAPACITY);
        let old = std::mem::replace(&mut self.table, Self::alloc_table(new_capacity));
        for slot in old {
            let mut cur = slot;
            while let Some(mut entry) = cur {
                cur = entry.next.take();
                let idx = Self::index_for(entry.key.as_ref(), new_capacity);
                entry.next = self.table[idx].take();
                self.table[idx] = Some(entry);
            }
        }
        self.threshold = Self::threshold_for(new_capacity, self.load_factor);
    }

    fn dismantle(table: &mut [Option<Box<Entry<K, V>>>]) {
        for slot in table {
            let mut cur = slot.take();
            while let Some(mut entry) = cur {
                cur = entry.next.take();
            }
        }
    }
}

impl<K: Hash + Eq, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for ChainedHashMap<K, V> {
    fn drop(&mut self) {
        // Unlink chains iteratively; a degenerate chain would otherwise
        // recurse once per entry through the Box drop glue.
        for slot in &mut self.table {
            let mut cur = slot.take();
            while let Some(mut entry) = cur {
                cur = entry.next.take();
            }
        }
    }
}

impl<K: Hash + Eq + fmt::Debug, V: fmt::Debug> fmt::Debug for ChainedHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> AssocMap for ChainedHashMap<K, V>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    type Key = Option<K>;
    type Value = V;

    fn len(&self) -> usize {
        self.len()
    }

    fn put(&mut self, key: Option<K>, value: V) -> Result<Option<V>, MapError> {
        Ok(self.put(key, value))
    }

    fn get(&self, key: &Option<K>) -> Result<Option<&V>, MapError> {
        Ok(self.get(key.as_ref()))
    }

    fn contains_key(&self, key: &Option<K>) -> Result<bool, MapError> {
        Ok(self.contains_key(key.as_ref()))
    }

    fn contains_value(&self, value: &V) -> bool {
        self.contains_value(value)
    }

    fn remove(&mut self, key: &Option<K>) -> Result<Option<V>, MapError> {
        Ok(self.remove(key.as_ref()))
    }

    fn clear(&mut self) {
        self.clear()
    }

    fn entries(&self) -> EntrySeq<'_, Option<K>, V> {
        Box::new(self.iter().map(|(k, v)| (k.cloned(), v)))
    }
}

/// Lazy forward-only cursor over the table: a bucket index plus a position in
/// that bucket's chain. Empty buckets are skipped as they are reached.
pub struct Iter<'a, K, V> {
    buckets: &'a [Option<Box<Entry<K, V>>>],
    index: usize,
    cur: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Option<&'a K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cur.is_none() {
            if self.index + 1 >= self.buckets.len() {
                return None;
            }
            self.index += 1;
            self.cur = self.buckets[self.index].as_deref();
        }
        let entry = self.cur.expect("loop above stops at a live entry");
        self.cur = entry.next.as_deref();
        Some((entry.key.as_ref(), &entry.value))
    }
}
