//! A 26-way trie map over lowercase-ASCII string keys.
//!
//! Each node owns an optional value and a lazily allocated array of 26 child
//! slots, one per letter. A key addresses the node reached by following its
//! letters from the root; the empty key addresses the root itself. Removal
//! prunes the longest key suffix that supports no other mapping, using two
//! short walks and auxiliary state that does not grow with the key.

use std::collections::VecDeque;
use std::fmt;

use crate::error::MapError;
use crate::map::{AssocMap, EntrySeq};

/// Children per node, one slot per letter of the lowercase ASCII alphabet.
pub const BRANCH_FACTOR: usize = 26;

/// Maps a key character to its child slot index (`'a'` is 0, `'z'` is 25).
///
/// # Errors
///
/// [`MapError::InvalidKeyChar`] for anything outside `'a' ..= 'z'`.
pub fn index_of(c: char) -> Result<usize, MapError> {
    if c.is_ascii_lowercase() {
        Ok(c as usize - 'a' as usize)
    } else {
        Err(MapError::InvalidKeyChar(c))
    }
}

/// Maps a child slot index back to its key character.
///
/// # Errors
///
/// [`MapError::InvalidChildIndex`] for an index of 26 or more.
pub fn char_of(index: usize) -> Result<char, MapError> {
    if index < BRANCH_FACTOR {
        Ok((b'a' + index as u8) as char)
    } else {
        Err(MapError::InvalidChildIndex(index))
    }
}

/// A trie node: an optional value plus up to 26 owned children.
///
/// The children array is not allocated until the first child is attached, so
/// leaf nodes cost one `Option` discriminant rather than 26 empty slots.
pub struct Node<V> {
    value: Option<V>,
    children: Option<Box<[Option<Box<Node<V>>>; BRANCH_FACTOR]>>,
}

/// Clones the whole subtree. Iterative for the same reason teardown is: a
/// single-key path is one node per character and must not recurse.
impl<V: Clone> Clone for Node<V> {
    fn clone(&self) -> Self {
        struct Frame<'a, V> {
            src: &'a Node<V>,
            dst: Node<V>,
            slot: usize,
            next_child: usize,
        }

        let mut stack = vec![Frame {
            src: self,
            dst: Node {
                value: self.value.clone(),
                children: None,
            },
            slot: 0,
            next_child: 0,
        }];
        loop {
            let top = stack.last_mut().expect("stack holds the root until done");
            let mut found = None;
            if let Some(children) = top.src.children.as_deref() {
                for i in top.next_child..BRANCH_FACTOR {
                    if let Some(child) = children[i].as_deref() {
                        found = Some((i, child));
                        break;
                    }
                }
            }
            match found {
                Some((i, child)) => {
                    top.next_child = i + 1;
                    stack.push(Frame {
                        src: child,
                        dst: Node {
                            value: child.value.clone(),
                            children: None,
                        },
                        slot: i,
                        next_child: 0,
                    });
                }
                None => {
                    let frame = stack.pop().expect("stack holds the root until done");
                    match stack.last_mut() {
                        None => return frame.dst,
                        Some(parent) => {
                            let children = parent
                                .dst
                                .children
                                .get_or_insert_with(|| Box::new(std::array::from_fn(|_| None)));
                            children[frame.slot] = Some(Box::new(frame.dst));
                        }
                    }
                }
            }
        }
    }
}

impl<V> Node<V> {
    fn new() -> Self {
        Node {
            value: None,
            children: None,
        }
    }

    /// The value stored at this node, if any.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// True when this node holds a value.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The child slot array, if it has been allocated. Allocated-but-empty
    /// and never-allocated are both possible; use [`Node::has_children`] to
    /// ask about live children.
    pub fn children(&self) -> Option<&[Option<Box<Node<V>>>; BRANCH_FACTOR]> {
        self.children.as_deref()
    }

    /// True when at least one child slot is occupied.
    pub fn has_children(&self) -> bool {
        self.child_count() > 0
    }

    /// The child reached via `c`, if present.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidKeyChar`] when `c` is not a lowercase ASCII letter.
    pub fn child(&self, c: char) -> Result<Option<&Node<V>>, MapError> {
        Ok(self.child_at(index_of(c)?))
    }

    fn child_at(&self, index: usize) -> Option<&Node<V>> {
        self.children.as_deref().and_then(|c| c[index].as_deref())
    }

    fn child_at_mut(&mut self, index: usize) -> Option<&mut Node<V>> {
        self.children
            .as_deref_mut()
            .and_then(|c| c[index].as_deref_mut())
    }

    fn child_count(&self) -> usize {
        self.children
            .as_deref()
            .map_or(0, |c| c.iter().filter(|slot| slot.is_some()).count())
    }

    fn ensure_child(&mut self, index: usize) -> &mut Node<V> {
        let children = self
            .children
            .get_or_insert_with(|| Box::new(std::array::from_fn(|_| None)));
        &mut **children[index].get_or_insert_with(|| Box::new(Node::new()))
    }

    fn take_child(&mut self, index: usize) -> Option<Box<Node<V>>> {
        self.children.as_deref_mut().and_then(|c| c[index].take())
    }

    /// Follows `path` (bytes already validated as lowercase letters) to the
    /// node it addresses. Every step must exist.
    fn descend_mut(&mut self, path: &[u8]) -> &mut Node<V> {
        let mut cur = self;
        for &b in path {
            cur = cur
                .child_at_mut((b - b'a') as usize)
                .expect("descent path was verified to exist");
        }
        cur
    }
}

impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        // A detached subtree is one node per remaining key character, so it
        // can be arbitrarily deep; dismantle with an explicit stack instead
        // of recursing through the Box drop glue.
        let mut stack: Vec<Box<Node<V>>> = Vec::new();
        if let Some(children) = self.children.take() {
            stack.extend((*children).into_iter().flatten());
        }
        while let Some(mut node) = stack.pop() {
            if let Some(children) = node.children.take() {
                stack.extend((*children).into_iter().flatten());
            }
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("children", &self.child_count())
            .finish()
    }
}

/// A map from lowercase-ASCII strings to values, keyed structurally by a
/// 26-way trie.
///
/// The empty string is a legal key and maps to the root's own value slot.
/// Removal prunes every node that existed solely to support the removed key,
/// so the trie's node count never drifts above what its live keys require.
///
/// # Example
///
/// ```rust
/// use mapkit::TrieMap;
///
/// let mut map: TrieMap<u32> = TrieMap::new();
/// map.put("pen", 24).unwrap();
/// map.put("penguin", 2).unwrap();
/// assert_eq!(map.remove("penguin").unwrap(), Some(2));
/// assert!(map.contains_key("pen").unwrap());
/// assert!(map.put("Pen", 1).is_err());
/// ```
#[derive(Clone)]
pub struct TrieMap<V> {
    root: Node<V>,
    size: usize,
}

impl<V> TrieMap<V> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        TrieMap {
            root: Node::new(),
            size: 0,
        }
    }

    /// Number of key-value mappings.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when the map holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The root node, for external inspection of the trie's structure. The
    /// root is the empty key's node; it is never pruned.
    pub fn root(&self) -> &Node<V> {
        &self.root
    }

    /// Maps `key` to `value`, returning the previously mapped value if any.
    /// Creates the key's path on demand.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidKeyChar`] if `key` contains anything outside
    /// `'a' ..= 'z'`; the trie is not modified.
    pub fn put(&mut self, key: &str, value: V) -> Result<Option<V>, MapError> {
        validate_key(key)?;
        let mut cur = &mut self.root;
        for b in key.bytes() {
            cur = cur.ensure_child((b - b'a') as usize);
        }
        let old = cur.value.replace(value);
        if old.is_none() {
            self.size += 1;
        }
        Ok(old)
    }

    /// Returns the value mapped to `key`, or `None` if there is no mapping.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidKeyChar`] for an out-of-alphabet key character.
    pub fn get(&self, key: &str) -> Result<Option<&V>, MapError> {
        validate_key(key)?;
        let mut cur = &self.root;
        for b in key.bytes() {
            match cur.child_at((b - b'a') as usize) {
                Some(child) => cur = child,
                None => return Ok(None),
            }
        }
        Ok(cur.value.as_ref())
    }

    /// True when a mapping for `key` exists.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidKeyChar`] for an out-of-alphabet key character.
    pub fn contains_key(&self, key: &str) -> Result<bool, MapError> {
        Ok(self.get(key)?.is_some())
    }

    /// True when some key maps to `value`. Breadth-first scan of every node;
    /// stops at the first match. O(node count).
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let mut queue: VecDeque<&Node<V>> = VecDeque::new();
        queue.push_back(&self.root);
        while let Some(node) = queue.pop_front() {
            if node.value.as_ref() == Some(value) {
                return true;
            }
            if let Some(children) = node.children.as_deref() {
                for child in children.iter().flatten() {
                    queue.push_back(child);
                }
            }
        }
        false
    }

    /// Removes the mapping for `key`, returning its value if one existed.
    ///
    /// Also detaches the longest trailing portion of the key's path that no
    /// other mapping needs: a first read-only walk finds the deepest node
    /// that must survive (it has other children, or holds a value of its
    /// own), a second walk severs the single edge below it. Both walks are
    /// iterative and track a constant amount of state.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidKeyChar`] for an out-of-alphabet key character; the
    /// trie is not modified.
    pub fn remove(&mut self, key: &str) -> Result<Option<V>, MapError> {
        validate_key(key)?;

        if key.is_empty() {
            let old = self.root.value.take();
            if old.is_some() {
                self.size -= 1;
            }
            return Ok(old);
        }
        if !self.contains_key(key)? {
            return Ok(None);
        }

        let bytes = key.as_bytes();

        // Find the deepest node on the path that must be kept: it fans out
        // to another key, or it terminates a shorter key. Everything below
        // it exists only for this key. The node at depth d is reached by the
        // first d letters; the root is depth 0 and always survives.
        let mut anchor_depth = 0usize;
        let mut sever = Some((bytes[0] - b'a') as usize);
        let mut cur = &self.root;
        for (i, &b) in bytes.iter().enumerate() {
            let child = cur
                .child_at((b - b'a') as usize)
                .expect("key presence was verified above");
            let fanout = child.child_count();
            if fanout > 1 || (fanout == 1 && child.has_value()) {
                anchor_depth = i + 1;
                sever = if i + 1 == bytes.len() {
                    // The terminal itself must survive; only its value goes.
                    None
                } else {
                    Some((bytes[i + 1] - b'a') as usize)
                };
            }
            cur = child;
        }

        let anchor = self.root.descend_mut(&bytes[..anchor_depth]);
        let removed = match sever {
            None => anchor.value.take(),
            Some(index) => {
                let mut node = anchor
                    .take_child(index)
                    .expect("severed edge lies on the key's path");
                for &b in &bytes[anchor_depth + 1..] {
                    node = node
                        .take_child((b - b'a') as usize)
                        .expect("key presence was verified above");
                }
                node.value.take()
            }
        };
        debug_assert!(removed.is_some());
        self.size -= 1;
        Ok(removed)
    }

    /// Removes all mappings by replacing the root. O(1) amortized over the
    /// discarded nodes.
    pub fn clear(&mut self) {
        self.root = Node::new();
        self.size = 0;
    }

    /// A lazy iteration over all entries in lexicographic key order, the
    /// empty key (if mapped) first. Depth-first with an explicit stack; uses
    /// space proportional to the longest live key, not the entry count.
    pub fn entries(&self) -> Entries<'_, V> {
        Entries {
            stack: vec![(&self.root, 0)],
            key: String::new(),
            emit_root: self.root.has_value(),
        }
    }
}

fn validate_key(key: &str) -> Result<(), MapError> {
    for c in key.chars() {
        index_of(c)?;
    }
    Ok(())
}

impl<V> Default for TrieMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for TrieMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<V: PartialEq> AssocMap for TrieMap<V> {
    type Key = String;
    type Value = V;

    fn len(&self) -> usize {
        self.len()
    }

    fn put(&mut self, key: String, value: V) -> Result<Option<V>, MapError> {
        self.put(&key, value)
    }

    fn get(&self, key: &String) -> Result<Option<&V>, MapError> {
        self.get(key)
    }

    fn contains_key(&self, key: &String) -> Result<bool, MapError> {
        self.contains_key(key)
    }

    fn contains_value(&self, value: &V) -> bool {
        self.contains_value(value)
    }

    fn remove(&mut self, key: &String) -> Result<Option<V>, MapError> {
        self.remove(key)
    }

    fn clear(&mut self) {
        self.clear()
    }

    fn entries(&self) -> EntrySeq<'_, String, V> {
        Box::new(self.entries())
    }
}

/// Depth-first cursor over the trie: a stack of (node, next child slot to
/// try) frames plus the key prefix spelled by the current stack.
pub struct Entries<'a, V> {
    stack: Vec<(&'a Node<V>, usize)>,
    key: String,
    emit_root: bool,
}

impl<'a, V> Iterator for Entries<'a, V> {
    type Item = (String, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if std::mem::take(&mut self.emit_root) {
            let (root, _) = self.stack[0];
            let value = root.value().expect("emit_root implies a root value");
            return Some((String::new(), value));
        }
        loop {
            let (node, start) = match self.stack.last() {
                Some(&frame) => frame,
                None => return None,
            };
            let mut found = None;
            if let Some(children) = node.children() {
                for i in start..BRANCH_FACTOR {
                    if let Some(child) = children[i].as_deref() {
                        found = Some((i, child));
                        break;
                    }
                }
            }
            match found {
                Some((i, child)) => {
                    self.stack.last_mut().expect("frame was read above").1 = i + 1;
                    self.key.push((b'a' + i as u8) as char);
                    self.stack.push((child, 0));
                    if let Some(value) = child.value() {
                        return Some((self.key.clone(), value));
                    }
                }
                None => {
                    self.stack.pop();
                    self.key.pop();
                }
            }
        }
    }
}
