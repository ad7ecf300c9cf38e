use std::collections::BTreeMap;

use counted_tree::{CountedTreeMap, OrderBy, Ordinal, TreeError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys from a range smaller than `TEST_SIZE` so that operations collide.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
    GetByOrdinal(usize),
    RemoveByOrdinal(usize),
    OrdinalOfKey(i64),
    RankOf(i64),
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        1 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
        2 => any::<usize>().prop_map(MapOp::GetByOrdinal),
        2 => any::<usize>().prop_map(MapOp::RemoveByOrdinal),
        1 => key_strategy().prop_map(MapOp::OrdinalOfKey),
        1 => key_strategy().prop_map(MapOp::RankOf),
    ]
}

/// Expected error for an ordinal lookup on a container of `len` entries.
fn ordinal_error(ordinal: usize, len: usize) -> TreeError {
    if len == 0 {
        TreeError::EmptyContainer
    } else {
        TreeError::OutOfRange { ordinal, len }
    }
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both CountedTreeMap and BTreeMap
    /// and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(
        order in 1usize..8,
        ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE),
    ) {
        let mut ct_map: CountedTreeMap<i64, i64> = CountedTreeMap::with_order(order);
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(ct_map.insert(*k, *v), Ok(bt_map.insert(*k, *v)), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(ct_map.remove(k), Ok(bt_map.remove(k)), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(ct_map.get(k), Ok(bt_map.get(k)), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(ct_map.contains_key(k), Ok(bt_map.contains_key(k)), "contains_key({})", k);
                }
                MapOp::FirstKeyValue => {
                    let expected = bt_map.first_key_value().ok_or(TreeError::EmptyContainer);
                    prop_assert_eq!(ct_map.first_key_value(), expected);
                }
                MapOp::LastKeyValue => {
                    let expected = bt_map.last_key_value().ok_or(TreeError::EmptyContainer);
                    prop_assert_eq!(ct_map.last_key_value(), expected);
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(ct_map.pop_first(), bt_map.pop_first());
                }
                MapOp::PopLast => {
                    prop_assert_eq!(ct_map.pop_last(), bt_map.pop_last());
                }
                MapOp::GetByOrdinal(raw) => {
                    // Mostly in range, sometimes just past the end.
                    let ordinal = raw % (bt_map.len() + 1);
                    let expected = bt_map.iter().nth(ordinal).ok_or(ordinal_error(ordinal, bt_map.len()));
                    prop_assert_eq!(ct_map.get_by_ordinal(ordinal), expected, "get_by_ordinal({})", ordinal);
                }
                MapOp::RemoveByOrdinal(raw) => {
                    let ordinal = raw % (bt_map.len() + 1);
                    let expected = match bt_map.keys().nth(ordinal).copied() {
                        Some(key) => Ok(bt_map.remove_entry(&key).unwrap()),
                        None => Err(ordinal_error(ordinal, bt_map.len())),
                    };
                    prop_assert_eq!(ct_map.remove_by_ordinal(ordinal), expected, "remove_by_ordinal({})", ordinal);
                }
                MapOp::OrdinalOfKey(k) => {
                    prop_assert_eq!(ct_map.ordinal_of_key(k), Ok(bt_map.range(..*k).count()), "ordinal_of_key({})", k);
                }
                MapOp::RankOf(k) => {
                    let expected = bt_map.contains_key(k).then(|| bt_map.range(..*k).count());
                    prop_assert_eq!(ct_map.rank_of(k), Ok(expected), "rank_of({})", k);
                }
            }
            prop_assert_eq!(ct_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(ct_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }
        prop_assert!(ct_map.iter().eq(bt_map.iter()));
    }

    /// Tests that iteration order and reported ordinals match BTreeMap after random insertions.
    #[test]
    fn iter_matches_btreemap(
        order in 1usize..8,
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
    ) {
        let mut ct_map = CountedTreeMap::with_order(order);
        let mut bt_map = BTreeMap::new();
        for (k, v) in &entries {
            ct_map.insert(*k, *v).unwrap();
            bt_map.insert(*k, *v);
        }

        let mut iter = ct_map.iter();
        prop_assert_eq!(iter.len(), bt_map.len());
        for (ordinal, expected) in bt_map.iter().enumerate() {
            prop_assert_eq!(iter.next(), Some(expected));
            prop_assert_eq!(iter.ordinal(), Some(ordinal));
        }
        prop_assert_eq!(iter.next(), None);

        prop_assert!(ct_map.iter().rev().eq(bt_map.iter().rev()));
        prop_assert!(ct_map.keys().eq(bt_map.keys()));
        prop_assert!(ct_map.values().eq(bt_map.values()));
        prop_assert!(ct_map.into_iter().eq(bt_map.into_iter()));
    }

    /// Every key maps to its ordinal and back.
    #[test]
    fn rank_round_trip(
        order in 1usize..8,
        keys in proptest::collection::btree_set(key_strategy(), 1..500),
    ) {
        let ct_map: CountedTreeMap<i64, ()> = {
            let mut map = CountedTreeMap::with_order(order);
            map.extend(keys.iter().map(|&k| (k, ())));
            map
        };
        for key in &keys {
            let ordinal = ct_map.ordinal_of_key(key).unwrap();
            prop_assert_eq!(ct_map.get_by_ordinal(ordinal).map(|(k, _)| k), Ok(key));
        }
    }

    /// Views agree with `BTreeMap::range` over the same bounds.
    #[test]
    fn sub_map_matches_btreemap_range(
        order in 1usize..6,
        keys in proptest::collection::btree_set(key_strategy(), 0..400),
        bounds in (key_strategy(), key_strategy()),
    ) {
        let (from, to) = if bounds.0 <= bounds.1 { bounds } else { (bounds.1, bounds.0) };
        let mut ct_map = CountedTreeMap::with_order(order);
        ct_map.extend(keys.iter().map(|&k| (k, k)));
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let expected: Vec<(&i64, &i64)> = bt_map.range(from..to).collect();

        let view = ct_map.sub_map(from, to).unwrap();
        prop_assert_eq!(view.len(), Ok(expected.len()));
        prop_assert_eq!(view.iter().unwrap().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(view.first_key_value().ok(), expected.first().copied());
        prop_assert_eq!(view.last_key_value().ok(), expected.last().copied());
        for (ordinal, entry) in expected.iter().enumerate() {
            prop_assert_eq!(view.get_by_ordinal(ordinal), Ok(*entry));
            prop_assert_eq!(view.ordinal_of_key(entry.0), Ok(ordinal));
        }
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

fn one_to_hundred(order: usize) -> CountedTreeMap<i32, i32> {
    let mut map = CountedTreeMap::with_order(order);
    for key in 1..=100 {
        map.insert(key, key * 100).unwrap();
    }
    map
}

#[test]
fn sub_map_window_over_one_to_hundred() {
    let mut map = one_to_hundred(4);
    let view = map.sub_map(10, 20).unwrap();
    assert_eq!(view.len(), Ok(10));
    assert_eq!(view.ordinal_of_key(&15), Ok(5));

    let mut view = map.sub_map_mut(10, 20).unwrap();
    assert_eq!(view.remove(&15), Ok(Some(1_500)));
    assert_eq!(view.insert(99, 0), Err(TreeError::IllegalBound));
    assert_eq!(map.get(&15), Ok(None));
    assert_eq!(map.len(), 99);

    map.insert(15, 7).unwrap();
    assert_eq!(map.sub_map(10, 20).unwrap().get(&15), Ok(Some(&7)));
}

#[test]
fn clear_then_lookups_report_empty() {
    let mut map = one_to_hundred(4);
    map.clear();
    assert_eq!(map.len(), 0);
    assert_eq!(map.first_key(), Err(TreeError::EmptyContainer));
    assert_eq!(map.last_key(), Err(TreeError::EmptyContainer));
    assert_eq!(map.get_by_ordinal(0), Err(TreeError::EmptyContainer));
    assert_eq!(map.iter().next(), None);

    map.insert(1, 1).unwrap();
    assert_eq!(map.first_key(), Ok(&1));
}

#[test]
fn overwrite_returns_previous_value() {
    let mut map = one_to_hundred(2);
    assert_eq!(map.insert(50, -1), Ok(Some(5_000)));
    assert_eq!(map.len(), 100);
    assert_eq!(map.ordinal_of_key(&50), Ok(49));
    assert_eq!(map[Ordinal(49)], -1);
}

#[test]
fn iterator_remove_leaves_the_rest() {
    let mut map = one_to_hundred(3);
    let mut entries = map.entries_mut();
    while let Some((&key, _)) = entries.next() {
        if key % 10 == 0 {
            assert_eq!(entries.remove(), Ok((key, key * 100)));
        }
    }
    let expected: Vec<i32> = (1..=100).filter(|k| k % 10 != 0).collect();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), expected);
    assert_eq!(map.len(), 90);
}

#[test]
fn ordinals_stay_dense_under_removal() {
    let mut map = one_to_hundred(2);
    for key in (1..=100).step_by(2) {
        map.remove(&key).unwrap();
    }
    for ordinal in 0..50 {
        let key = i32::try_from(ordinal).unwrap() * 2 + 2;
        assert_eq!(map.get_by_ordinal(ordinal).map(|(k, _)| *k), Ok(key));
    }
}

#[test]
fn descending_comparator_reverses_ordinals() {
    let mut map = CountedTreeMap::with_order_and_comparator(2, OrderBy(|a: &i32, b: &i32| b.cmp(a)));
    map.extend((0..20).map(|k| (k, ())));
    assert_eq!(map.first_key(), Ok(&19));
    assert_eq!(map.ordinal_of_key(&0), Ok(19));
    let view = map.sub_map(15, 5).unwrap();
    assert_eq!(view.keys().unwrap().copied().collect::<Vec<_>>(), [15, 14, 13, 12, 11, 10, 9, 8, 7, 6]);
    assert_eq!(map.sub_map(5, 15).err(), Some(TreeError::IllegalBound));
}

#[test]
fn incomparable_keys_are_reported() {
    let mut map = CountedTreeMap::new();
    map.insert(1.0, "one").unwrap();
    assert_eq!(map.insert(f64::NAN, "nan"), Err(TreeError::TypeMismatch));
    assert_eq!(map.get(&f64::NAN), Err(TreeError::TypeMismatch));
    assert_eq!(map.ordinal_of_key(&f64::NAN), Err(TreeError::TypeMismatch));
    assert_eq!(map.sub_map(f64::NAN, 2.0).err(), Some(TreeError::TypeMismatch));
    assert_eq!(map.len(), 1);
}

#[test]
fn clone_and_equality() {
    let map = one_to_hundred(5);
    let mut copy = map.clone();
    assert_eq!(copy, map);
    copy.insert(0, 0).unwrap();
    assert_ne!(copy, map);
    let collected: CountedTreeMap<i32, char> = [(2, 'b'), (1, 'a')].into_iter().collect();
    assert_eq!(CountedTreeMap::from([(1, 'a'), (2, 'b')]), collected);
}
