use super::*;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::collections::HashMap as StdHashMap;
use std::hash::Hash;

/// Structural invariants of the hash table: power-of-two capacity, every
/// entry reachable from the bucket its key hashes to, reachable count equal
/// to the reported size.
fn validate_hash_map<K: Hash + Eq, V>(m: &ChainedHashMap<K, V>) {
    assert!(
        m.capacity().is_power_of_two(),
        "capacity must stay a power of two"
    );

    let mut reachable = 0usize;
    for (i, slot) in m.table().iter().enumerate() {
        let mut cur = slot.as_deref();
        while let Some(entry) = cur {
            assert_eq!(
                m.bucket_of(entry.key()),
                i,
                "entry reachable from a bucket its key does not hash to"
            );
            reachable += 1;
            cur = entry.next();
        }
    }
    assert_eq!(reachable, m.len(), "reachable entries must match size");
}

/// Structural invariants of the trie: no dangling pure-path nodes below the
/// root, value-bearing node count equal to the reported size.
fn validate_trie<V>(t: &TrieMap<V>) {
    let mut stack = vec![(t.root(), true)];
    let mut valued = 0usize;
    while let Some((node, is_root)) = stack.pop() {
        if node.has_value() {
            valued += 1;
        }
        assert!(
            is_root || node.has_value() || node.has_children(),
            "non-root node with neither value nor children"
        );
        if let Some(children) = node.children() {
            for child in children.iter().flatten() {
                stack.push((&**child, false));
            }
        }
    }
    assert_eq!(valued, t.len(), "value-bearing nodes must match size");
}

#[derive(Clone, Debug)]
enum HashOp {
    Put(Option<u16>, u64),
    Remove(Option<u16>),
    Get(Option<u16>),
    Clear,
}

fn hash_key() -> impl Strategy<Value = Option<u16>> {
    // A small key space with an occasional absent key keeps the ops colliding.
    proptest::option::weighted(0.95, 0u16..48)
}

fn hash_op() -> impl Strategy<Value = HashOp> {
    prop_oneof![
        8 => (hash_key(), any::<u64>()).prop_map(|(k, v)| HashOp::Put(k, v)),
        3 => hash_key().prop_map(HashOp::Remove),
        3 => hash_key().prop_map(HashOp::Get),
        1 => Just(HashOp::Clear),
    ]
}

fn run_hash_ops(initial_capacity: usize, ops: &[HashOp]) {
    let mut map: ChainedHashMap<u16, u64> =
        ChainedHashMap::with_capacity(initial_capacity).expect("valid capacity");
    let mut model: StdHashMap<Option<u16>, u64> = StdHashMap::new();

    for op in ops {
        match op.clone() {
            HashOp::Put(k, v) => {
                assert_eq!(map.put(k, v), model.insert(k, v));
            }
            HashOp::Remove(k) => {
                assert_eq!(map.remove(k.as_ref()), model.remove(&k));
            }
            HashOp::Get(k) => {
                assert_eq!(map.get(k.as_ref()), model.get(&k));
                assert_eq!(map.contains_key(k.as_ref()), model.contains_key(&k));
            }
            HashOp::Clear => {
                map.clear();
                model.clear();
            }
        }
        assert_eq!(map.len(), model.len());
    }

    validate_hash_map(&map);
    let listed: BTreeMap<Option<u16>, u64> =
        map.iter().map(|(k, v)| (k.copied(), *v)).collect();
    let expected: BTreeMap<Option<u16>, u64> =
        model.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(listed, expected);
}

#[derive(Clone, Debug)]
enum TrieOp {
    Put(String, u64),
    Remove(String),
    Get(String),
    Clear,
}

fn trie_key() -> impl Strategy<Value = String> {
    prop_oneof![
        // Tiny alphabet, so keys share prefixes and pruning gets exercised.
        10 => "[a-c]{0,8}",
        3 => "[a-z]{0,12}",
        // Out-of-alphabet keys must be rejected without a trace.
        1 => "[a-z]{0,3}[A-Z0-9][a-z]{0,3}",
    ]
}

fn trie_op() -> impl Strategy<Value = TrieOp> {
    prop_oneof![
        8 => (trie_key(), any::<u64>()).prop_map(|(k, v)| TrieOp::Put(k, v)),
        4 => trie_key().prop_map(TrieOp::Remove),
        3 => trie_key().prop_map(TrieOp::Get),
        1 => Just(TrieOp::Clear),
    ]
}

fn valid_trie_key(key: &str) -> bool {
    key.chars().all(|c| c.is_ascii_lowercase())
}

fn run_trie_ops(ops: &[TrieOp]) {
    let mut map: TrieMap<u64> = TrieMap::new();
    let mut model: BTreeMap<String, u64> = BTreeMap::new();

    for op in ops {
        match op.clone() {
            TrieOp::Put(k, v) => {
                if valid_trie_key(&k) {
                    assert_eq!(map.put(&k, v), Ok(model.insert(k, v)));
                } else {
                    assert!(map.put(&k, v).is_err());
                }
            }
            TrieOp::Remove(k) => {
                if valid_trie_key(&k) {
                    assert_eq!(map.remove(&k), Ok(model.remove(&k)));
                } else {
                    assert!(map.remove(&k).is_err());
                }
            }
            TrieOp::Get(k) => {
                if valid_trie_key(&k) {
                    assert_eq!(map.get(&k), Ok(model.get(&k)));
                    assert_eq!(map.contains_key(&k), Ok(model.contains_key(&k)));
                } else {
                    assert!(map.get(&k).is_err());
                }
            }
            TrieOp::Clear => {
                map.clear();
                model.clear();
            }
        }
        assert_eq!(map.len(), model.len());
    }

    validate_trie(&map);
    // Lexicographic entry order must agree with the ordered model exactly.
    let listed: Vec<(String, u64)> = map.entries().map(|(k, v)| (k, *v)).collect();
    let expected: Vec<(String, u64)> =
        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
    assert_eq!(listed, expected);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn hash_map_matches_std_model(ops in prop::collection::vec(hash_op(), 0..400)) {
        run_hash_ops(16, &ops);
    }

    #[test]
    fn hash_map_matches_std_model_under_heavy_resizing(
        ops in prop::collection::vec(hash_op(), 0..400),
    ) {
        // Starting from a single bucket forces a doubling cascade.
        run_hash_ops(1, &ops);
    }

    #[test]
    fn trie_matches_ordered_model(ops in prop::collection::vec(trie_op(), 0..400)) {
        run_trie_ops(&ops);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], f: &mut impl FnMut(&[T])) {
    fn recurse<T: Clone>(prefix: &mut Vec<T>, rest: &[T], f: &mut impl FnMut(&[T])) {
        if rest.is_empty() {
            f(prefix);
            return;
        }
        for i in 0..rest.len() {
            let mut remaining = rest.to_vec();
            let item = remaining.remove(i);
            prefix.push(item);
            recurse(prefix, &remaining, f);
            prefix.pop();
        }
    }
    recurse(&mut Vec::new(), items, f);
}

/// Every removal order over a prefix-heavy key set must keep the trie
/// structurally sound and the surviving keys intact.
#[test]
fn trie_exhaustive_remove_orders() {
    let keys = ["", "a", "abab", "abb", "abbbc", "acbb"];
    for_each_permutation(&keys, &mut |order| {
        let mut map: TrieMap<usize> = TrieMap::new();
        for (i, k) in keys.iter().enumerate() {
            map.put(k, i).unwrap();
        }
        let mut alive: BTreeMap<&str, usize> =
            keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();

        for k in order {
            let expected = alive.remove(k);
            assert_eq!(map.remove(k).unwrap(), expected);
            validate_trie(&map);
            for (live, v) in &alive {
                assert_eq!(map.get(live).unwrap(), Some(v));
            }
        }
        assert!(map.is_empty());
        assert!(!map.root().has_children());
    });
}

#[test]
fn randomized_hash_ops_against_std() {
    for seed in 0..4u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut map: ChainedHashMap<u32, u32> = ChainedHashMap::with_capacity(2).unwrap();
        let mut model: StdHashMap<Option<u32>, u32> = StdHashMap::new();

        for _ in 0..10_000 {
            let key = if rng.gen_ratio(1, 20) {
                None
            } else {
                Some(rng.gen_range(0..512))
            };
            match rng.gen_range(0..3) {
                0 => {
                    let v = rng.gen();
                    assert_eq!(map.put(key, v), model.insert(key, v));
                }
                1 => assert_eq!(map.remove(key.as_ref()), model.remove(&key)),
                _ => assert_eq!(map.get(key.as_ref()), model.get(&key)),
            }
            assert_eq!(map.len(), model.len());
        }
        validate_hash_map(&map);
    }
}

#[test]
fn randomized_trie_ops_against_btree() {
    for seed in 0..4u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut map: TrieMap<u32> = TrieMap::new();
        let mut model: BTreeMap<String, u32> = BTreeMap::new();

        for _ in 0..10_000 {
            let len = rng.gen_range(0..=8);
            let key: String = (0..len)
                .map(|_| (b'a' + rng.gen_range(0..4u8)) as char)
                .collect();
            match rng.gen_range(0..3) {
                0 => {
                    let v = rng.gen();
                    assert_eq!(map.put(&key, v).unwrap(), model.insert(key, v));
                }
                1 => assert_eq!(map.remove(&key).unwrap(), model.remove(&key)),
                _ => assert_eq!(map.get(&key).unwrap(), model.get(&key)),
            }
            assert_eq!(map.len(), model.len());
        }
        validate_trie(&map);
        let listed: Vec<(String, u32)> = map.entries().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(String, u32)> =
            model.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(listed, expected);
    }
}
