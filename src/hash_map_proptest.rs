#![cfg(test)]

// Property tests for HashMap kept inside the crate so they can reach the
// bucket layout and run against every allocation strategy.

use crate::allocator::{Allocator, Arena, Heap};
use crate::byte_view::ByteView;
use crate::hash_map::{Bucket, HashMap, INITIAL_CAPACITY};
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap as ModelMap};
use std::hash::Hasher;

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrDefault(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::GetOrDefault),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![contains_pool, "[a-z]{0,5}".prop_map(|s| s)].prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Replays `ops` against `sut` and a std model, checking parity after each op.
fn run_against_model<A, S>(
    sut: &mut HashMap<String, i32, A, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    A: Allocator<Bucket<String, i32>>,
    S: BuildHasher,
{
    let mut model: ModelMap<String, i32> = ModelMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(k.clone(), v).expect("allocation");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::GetOrDefault(i) => {
                let k = pool[i].clone();
                let got = *sut.get_or_insert_default(k.clone()).expect("allocation");
                prop_assert_eq!(got, *model.entry(k).or_default());
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k.as_str()), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Iterate => {
                let s_entries: BTreeSet<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m_entries: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_entries, m_entries);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() == 0 || sut.capacity().is_power_of_two());
        prop_assert!(sut.len() <= sut.capacity());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - `insert` returns the previous value exactly when the model does.
// - default-on-miss access creates at most one entry per key.
// - `get`/`contains_key` parity, `get_mut` updates visible to later lookups.
// - `len` counts distinct keys; capacity stays a power of two.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: HashMap<String, i32> = HashMap::new();
        run_against_model(&mut sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants under worst-case collisions, where every key
// probes from bucket 0.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: HashMap<String, i32, Heap, ConstBuildHasher> =
            HashMap::with_hasher_in(ConstBuildHasher, Heap);
        run_against_model(&mut sut, &pool, ops)?;
    }
}

// Property: same invariants with buckets carved out of an arena.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_in_arena((pool, ops) in arb_scenario()) {
        let mut arena: Arena<Bucket<String, i32>> = Arena::with_capacity(INITIAL_CAPACITY);
        {
            let mut sut = HashMap::new_in(&mut arena);
            run_against_model(&mut sut, &pool, ops)?;
        }
        prop_assert_eq!(arena.live_buffers(), 0);
    }
}

// Property: growth preserves content. Enough distinct keys to force several
// doublings; every key keeps its value and the bucket array never holds a key
// twice.
proptest! {
    #![proptest_config(ProptestConfig { cases: 16, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_entries(keys in proptest::collection::hash_set(any::<u64>(), 300..1200)) {
        let mut sut: HashMap<u64, u64> = HashMap::new();
        for &k in &keys {
            sut.insert(k, k.wrapping_mul(31)).unwrap();
        }
        prop_assert_eq!(sut.len(), keys.len());
        prop_assert!(sut.capacity() >= 2 * INITIAL_CAPACITY);
        for &k in &keys {
            prop_assert_eq!(sut.get(&k), Some(&k.wrapping_mul(31)));
        }
        let distinct: BTreeSet<u64> = sut.keys().copied().collect();
        prop_assert_eq!(distinct.len(), sut.len());
    }
}

// Property: the hash/equality law for byte views. Views over different
// buffers with the same bytes are equal and hash identically under the
// map's hasher, so either one finds the other's entry.
proptest! {
    #[test]
    fn prop_byte_view_hash_follows_content(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
        let copy = bytes.clone();
        let a = ByteView::new(&bytes);
        let b = ByteView::new(&copy);
        prop_assert_eq!(a, b);

        let mut sut: HashMap<ByteView<'_>, usize> = HashMap::new();
        prop_assert_eq!(sut.hasher().hash_one(a), sut.hasher().hash_one(b));
        sut.insert(a, 1).unwrap();
        *sut.get_or_insert_default(b).unwrap() += 1;
        prop_assert_eq!(sut.len(), 1);
        prop_assert_eq!(sut.get(&a), Some(&2));
    }
}
