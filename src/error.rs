//! Error type shared by both map implementations.

use thiserror::Error;

/// Invalid-argument conditions surfaced by map constructors and trie key
/// handling.
///
/// Missing keys are never errors; lookups and removals report them as `None`
/// through their ordinary return value.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MapError {
    /// A hash map was constructed with a zero initial capacity.
    #[error("illegal initial capacity: {0}")]
    InvalidCapacity(usize),

    /// A hash map was constructed with a non-positive or NaN load factor.
    #[error("illegal load factor: {0}")]
    InvalidLoadFactor(f32),

    /// A trie key contained a character outside `'a' ..= 'z'`.
    #[error("key character {0:?} is outside the range ['a'..'z']")]
    InvalidKeyChar(char),

    /// A child index was outside `0 .. BRANCH_FACTOR`.
    #[error("child index {0} is outside the range [0..26)")]
    InvalidChildIndex(usize),
}
