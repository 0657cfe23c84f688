//! # mapkit
//!
//! Two classic in-memory associative containers built from first principles,
//! sharing one abstract map contract:
//!
//! - [`ChainedHashMap`]: a hash table with separate chaining, supplemental
//!   bit-mixing hashing, and power-of-two amortized-doubling growth. The
//!   absent key is `Option<K>`'s `None` and is itself a legal key.
//! - [`TrieMap`]: a 26-way trie over lowercase-ASCII string keys with
//!   lexicographic entry iteration and structural pruning on removal, so the
//!   node count never drifts above what the live keys require.
//!
//! Both implement [`AssocMap`], which also provides derived behavior
//! (rendering, cross-implementation equality) built purely atop the
//! contract's primitives. Internal structure is exposed read-only through
//! [`ChainedHashMap::table`] and [`TrieMap::root`] for visualization and
//! structural testing.
//!
//! Neither container is thread-safe; both are plain single-threaded values.
//!
//! ## Example
//!
//! ```rust
//! use mapkit::{AssocMap, ChainedHashMap, TrieMap};
//!
//! let mut ages: ChainedHashMap<&str, u32> = ChainedHashMap::new();
//! ages.put(Some("ada"), 36);
//! ages.put(None, 0);
//! assert_eq!(ages.get(Some(&"ada")), Some(&36));
//! assert_eq!(ages.len(), 2);
//!
//! let mut words: TrieMap<u32> = TrieMap::new();
//! words.put("pen", 24)?;
//! words.put("penguin", 2)?;
//! assert_eq!(words.remove("penguin")?, Some(2));
//! assert!(words.contains_key("pen")?);
//! let keys: Vec<String> = words.entries().map(|(k, _)| k).collect();
//! assert_eq!(keys, vec!["pen".to_string()]);
//! # Ok::<(), mapkit::MapError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hash_map;
pub mod map;
pub mod trie_map;

pub use error::MapError;
pub use hash_map::ChainedHashMap;
pub use map::AssocMap;
pub use trie_map::TrieMap;

#[cfg(test)]
mod proptests;
