//! The abstract map contract shared by both container implementations.

use std::fmt;

use crate::error::MapError;

/// A lazy, single-pass sequence of key-value pairs.
///
/// Not restartable: obtain a fresh sequence from [`AssocMap::entries`] to
/// iterate again.
pub type EntrySeq<'a, K, V> = Box<dyn Iterator<Item = (K, &'a V)> + 'a>;

/// The contract both containers implement, mirroring the classic map
/// interface: size, lookup, insertion, removal, membership queries, clearing,
/// and lazy entry iteration.
///
/// Fallible methods report invalid arguments (see [`MapError`]); a missing key
/// is not an error and is reported as `Ok(None)` or `Ok(false)`.
pub trait AssocMap {
    /// The key type. Implementations choose how "absence" is spelled; the
    /// hash map uses `Option<K>` so the absent key is itself a legal key.
    type Key;
    /// The mapped value type.
    type Value;

    /// Number of key-value mappings.
    fn len(&self) -> usize;

    /// True when the map holds no mappings.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps `key` to `value`, returning the previously mapped value if any.
    fn put(&mut self, key: Self::Key, value: Self::Value) -> Result<Option<Self::Value>, MapError>;

    /// Returns the value mapped to `key`, or `None` if there is no mapping.
    fn get(&self, key: &Self::Key) -> Result<Option<&Self::Value>, MapError>;

    /// True when a mapping for `key` exists.
    fn contains_key(&self, key: &Self::Key) -> Result<bool, MapError>;

    /// True when some key maps to `value`. Full traversal; stops at the first
    /// match.
    fn contains_value(&self, value: &Self::Value) -> bool;

    /// Removes the mapping for `key`, returning its value if one existed.
    fn remove(&mut self, key: &Self::Key) -> Result<Option<Self::Value>, MapError>;

    /// Removes all mappings.
    fn clear(&mut self);

    /// A lazy iteration over all entries. The order is implementation
    /// defined; mutating the map invalidates the sequence (statically
    /// enforced by the borrow on `self`).
    fn entries(&self) -> EntrySeq<'_, Self::Key, Self::Value>;

    /// Renders the whole map as `{k: v, ...}`, built purely atop
    /// [`AssocMap::entries`].
    fn render(&self) -> String
    where
        Self::Key: fmt::Debug,
        Self::Value: fmt::Debug,
    {
        let mut out = String::from("{");
        for (i, (k, v)) in self.entries().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("{k:?}: {v:?}"));
        }
        out.push('}');
        out
    }

    /// True when `other` maps exactly the same keys to equal values, built
    /// purely atop [`AssocMap::len`], [`AssocMap::entries`], and
    /// [`AssocMap::get`]. Usable across implementations sharing a key type.
    fn entries_eq<M>(&self, other: &M) -> bool
    where
        M: AssocMap<Key = Self::Key, Value = Self::Value>,
        Self::Value: PartialEq,
    {
        if self.len() != other.len() {
            return false;
        }
        self.entries()
            .all(|(k, v)| matches!(other.get(&k), Ok(Some(w)) if w == v))
    }
}
