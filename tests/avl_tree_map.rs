use std::collections::BTreeMap;
use std::ops::{Bound, RangeBounds};

use avl_tree_map::avl_tree_map::Entry;
use avl_tree_map::{AvlTreeMap, Error, Reversed};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
#[cfg(not(miri))]
const TEST_SIZE: usize = 2_000;
#[cfg(miri)]
const TEST_SIZE: usize = 40;

/// Keys drawn from a range narrower than `TEST_SIZE` so that collisions are common.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// Upper bound on the height of an AVL tree with `len` entries.
fn max_height(len: usize) -> usize {
    // h < 1.4405 log2(n + 2) - 0.3277
    let bound = 1.4405 * ((len + 2) as f64).log2() - 0.3277;
    bound as usize + 1
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Erase(i64),
    Get(i64),
    TryGet(i64),
    Count(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Erase),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::TryGet),
        1 => key_strategy().prop_map(MapOp::Count),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both AvlTreeMap and BTreeMap and asserts
    /// identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut avl: AvlTreeMap<i64, i64> = AvlTreeMap::new();
        let mut bt: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(avl.insert(*k, *v), bt.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(avl.remove(k), bt.remove(k), "remove({})", k);
                }
                MapOp::Erase(k) => {
                    prop_assert_eq!(avl.erase(k), usize::from(bt.remove(k).is_some()), "erase({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(avl.get(k), bt.get(k), "get({})", k);
                }
                MapOp::TryGet(k) => {
                    prop_assert_eq!(avl.try_get(k).ok(), bt.get(k), "try_get({})", k);
                }
                MapOp::Count(k) => {
                    prop_assert_eq!(avl.count(k), usize::from(bt.contains_key(k)), "count({})", k);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(avl.first_key_value(), bt.first_key_value());
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(avl.last_key_value(), bt.last_key_value());
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(avl.pop_first(), bt.pop_first());
                }
                MapOp::PopLast => {
                    prop_assert_eq!(avl.pop_last(), bt.pop_last());
                }
            }
            prop_assert_eq!(avl.len(), bt.len(), "len mismatch after {:?}", op);
            prop_assert!(avl.height() <= max_height(avl.len()), "height {} for len {}", avl.height(), avl.len());
        }
    }

    /// Tests that iteration order matches BTreeMap after random insertions.
    #[test]
    fn iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let avl_items: Vec<_> = avl.iter().map(|(&k, &v)| (k, v)).collect();
        let bt_items: Vec<_> = bt.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&avl_items, &bt_items, "iter() mismatch");

        let avl_rev: Vec<_> = avl.iter().rev().map(|(&k, &v)| (k, v)).collect();
        let bt_rev: Vec<_> = bt.iter().rev().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&avl_rev, &bt_rev, "iter().rev() mismatch");

        prop_assert!(avl.keys().copied().eq(bt.keys().copied()), "keys() mismatch");
        prop_assert!(avl.values().copied().eq(bt.values().copied()), "values() mismatch");
        prop_assert_eq!(avl.iter().len(), bt.len());

        let avl_into: Vec<_> = avl.clone().into_iter().collect();
        let bt_into: Vec<_> = bt.clone().into_iter().collect();
        prop_assert_eq!(&avl_into, &bt_into, "into_iter() mismatch");
    }

    /// Walking a cursor from the front visits exactly `len` entries in key order, and walking
    /// back from the end visits them in reverse.
    #[test]
    fn cursor_walks_match_iteration(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();

        let mut forward = Vec::new();
        let mut cursor = avl.cursor_front();
        while let Some((&k, _)) = cursor.key_value() {
            forward.push(k);
            cursor.move_next();
        }
        prop_assert_eq!(cursor, avl.cursor_end());
        prop_assert!(forward.iter().copied().eq(avl.keys().copied()));

        let mut backward = Vec::new();
        let mut cursor = avl.cursor_end();
        while !avl.is_empty() {
            cursor.move_prev();
            match cursor.key() {
                Some(&k) => backward.push(k),
                None => break,
            }
        }
        backward.reverse();
        prop_assert_eq!(backward, forward);
    }

    /// Tests lower_bound/upper_bound against BTreeMap ranges and against the scan variants.
    #[test]
    fn bounds_match_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        needles in proptest::collection::vec(key_strategy(), 50),
    ) {
        let avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        for needle in &needles {
            let lower = bt.range(needle..).next();
            let upper = bt.range((Bound::Excluded(needle), Bound::Unbounded)).next();
            prop_assert_eq!(avl.lower_bound(needle).key_value(), lower, "lower_bound({})", needle);
            prop_assert_eq!(avl.upper_bound(needle).key_value(), upper, "upper_bound({})", needle);
            prop_assert_eq!(avl.lower_bound(needle), avl.lower_bound_scan(needle));
            prop_assert_eq!(avl.upper_bound(needle), avl.upper_bound_scan(needle));

            let (lo, hi) = avl.equal_range(needle);
            prop_assert_eq!(lo == hi, !bt.contains_key(needle), "equal_range({})", needle);
        }
    }

    /// Tests range queries match BTreeMap.
    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        lo in key_strategy(),
        hi in key_strategy(),
    ) {
        let avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

        let avl_range: Vec<_> = avl.range(lo..=hi).collect();
        let bt_range: Vec<_> = bt.range(lo..=hi).collect();
        prop_assert_eq!(&avl_range, &bt_range, "range({}..={}) mismatch", lo, hi);

        let avl_range: Vec<_> = avl.range(lo..hi).rev().collect();
        let bt_range: Vec<_> = bt.range(lo..hi).rev().collect();
        prop_assert_eq!(&avl_range, &bt_range, "range({}..{}).rev() mismatch", lo, hi);

        let avl_range: Vec<_> = avl.range((Bound::Excluded(lo), Bound::Included(hi))).collect();
        let bt_range: Vec<_> = bt.range((Bound::Excluded(lo), Bound::Included(hi))).collect();
        prop_assert_eq!(&avl_range, &bt_range, "range((Excluded({}), Included({}))) mismatch", lo, hi);

        prop_assert_eq!(avl.range(..).count(), bt.len());
    }

    /// Tests iter_mut, values_mut and get_mut modify the same values as BTreeMap.
    #[test]
    fn mutation_through_iterators_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        keys_to_mutate in proptest::collection::vec(key_strategy(), 100),
    ) {
        let mut avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        for (k, v) in avl.iter_mut() {
            *v = v.wrapping_add(*k);
        }
        for (k, v) in bt.iter_mut() {
            *v = v.wrapping_add(*k);
        }
        for v in avl.values_mut().rev().step_by(3) {
            *v = 0;
        }
        for v in bt.values_mut().rev().step_by(3) {
            *v = 0;
        }
        for k in &keys_to_mutate {
            if let Some(v) = avl.get_mut(k) {
                *v = v.wrapping_sub(1);
            }
            if let Some(v) = bt.get_mut(k) {
                *v = v.wrapping_sub(1);
            }
        }

        prop_assert!(avl.iter().eq(bt.iter()));
    }

    /// Tests retain matches BTreeMap.
    #[test]
    fn retain_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        avl.retain(|k, v| (k ^ *v) % 3 != 0);
        bt.retain(|k, v| (k ^ *v) % 3 != 0);

        prop_assert!(avl.iter().eq(bt.iter()));
        prop_assert!(avl.height() <= max_height(avl.len()));
    }

    /// Tests the entry API against BTreeMap's.
    #[test]
    fn entry_api_matches_btreemap(
        ops in proptest::collection::vec((key_strategy(), 0u8..4), TEST_SIZE),
    ) {
        let mut avl: AvlTreeMap<i64, i64> = AvlTreeMap::new();
        let mut bt: BTreeMap<i64, i64> = BTreeMap::new();

        for (k, kind) in &ops {
            match kind {
                0 => {
                    *avl.entry(*k).or_insert(0) += 1;
                    *bt.entry(*k).or_insert(0) += 1;
                }
                1 => {
                    avl.entry(*k).and_modify(|v| *v *= 2).or_insert_with(|| 7);
                    bt.entry(*k).and_modify(|v| *v *= 2).or_insert_with(|| 7);
                }
                2 => {
                    let a = match avl.entry(*k) {
                        Entry::Occupied(o) => Some(o.remove_entry()),
                        Entry::Vacant(_) => None,
                    };
                    let b = match bt.entry(*k) {
                        std::collections::btree_map::Entry::Occupied(o) => Some(o.remove_entry()),
                        std::collections::btree_map::Entry::Vacant(_) => None,
                    };
                    prop_assert_eq!(a, b);
                }
                _ => {
                    prop_assert_eq!(*avl.get_or_insert_default(*k), *bt.entry(*k).or_default());
                }
            }
        }

        prop_assert!(avl.iter().eq(bt.iter()));
    }

    /// Removing every entry through a mutable cursor leaves an empty map.
    #[test]
    fn cursor_removal_drains_map(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE)) {
        let mut avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let mut removed = Vec::new();
        let mut cursor = avl.cursor_front_mut();
        while let Some(pair) = cursor.remove_current() {
            removed.push(pair);
        }
        prop_assert!(cursor.is_end());
        prop_assert!(removed.into_iter().eq(bt));
        prop_assert!(avl.is_empty());
        prop_assert_eq!(avl.cursor_front(), avl.cursor_end());
    }

    /// Tests remove_range against BTreeMap::retain over the same bounds.
    #[test]
    fn remove_range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        lo in key_strategy(),
        hi in key_strategy(),
        excluded_start in any::<bool>(),
    ) {
        let mut avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let (lo, hi) = (lo.min(hi), lo.max(hi));
        let start = if excluded_start { Bound::Excluded(lo) } else { Bound::Included(lo) };
        let bounds = (start, Bound::Included(hi));

        let before = bt.len();
        bt.retain(|k, _| !bounds.contains(k));
        prop_assert_eq!(avl.remove_range(bounds), before - bt.len());
        prop_assert!(avl.iter().eq(bt.iter()));
        prop_assert!(avl.height() <= max_height(avl.len()));
    }

    /// Tests CursorMut::remove_until against BTreeMap::retain, and that the cursor lands on the
    /// first surviving key.
    #[test]
    fn remove_until_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        from in key_strategy(),
        until in key_strategy(),
    ) {
        let mut avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let mut cursor = avl.lower_bound_mut(&from);
        let removed = cursor.remove_until(&until);
        let landed = cursor.key().copied();

        let before = bt.len();
        bt.retain(|&k, _| k < from || k >= until);
        prop_assert_eq!(removed, before - bt.len());
        prop_assert_eq!(landed, bt.range(from..).next().map(|(&k, _)| k));
        prop_assert!(avl.iter().eq(bt.iter()));
    }

    /// Every reference yielded by iter_mut, from either end, stays usable until the iterator's
    /// borrow ends.
    #[test]
    fn iter_mut_items_can_be_held_together(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        reverse in any::<bool>(),
    ) {
        let mut avl: AvlTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let held: Vec<(&i64, &mut i64)> = if reverse { avl.iter_mut().rev().collect() } else { avl.iter_mut().collect() };
        for (k, v) in held {
            *v = v.wrapping_add(*k);
        }
        for (k, v) in &mut bt {
            *v = v.wrapping_add(*k);
        }

        prop_assert!(avl.iter().eq(bt.iter()));
    }
}

// ─── Holding mutable iterator items together ─────────────────────────────────

#[test]
fn iter_mut_items_stay_valid_after_collect() {
    let mut map: AvlTreeMap<i32, i32> = (0..64).map(|k| (k * 5 % 64, k * 5 % 64)).collect();
    let items: Vec<(&i32, &mut i32)> = map.iter_mut().collect();
    for (k, v) in items {
        *v += k;
    }
    assert!(map.iter().all(|(k, v)| *v == 2 * k));
}

#[test]
fn iter_mut_items_written_during_and_after_the_walk() {
    let mut map: AvlTreeMap<i32, i32> = (0..64).map(|k| (k, 0)).collect();
    let mut held = Vec::new();
    for (_, v) in map.iter_mut().rev() {
        *v += 1;
        held.push(v);
    }
    for v in held {
        *v += 1;
    }
    assert!(map.values().all(|&v| v == 2));
}

#[test]
fn values_mut_items_from_both_ends_held_together() {
    let mut map: AvlTreeMap<i32, String> = (0..33).map(|k| (k, k.to_string())).collect();
    let mut values = map.values_mut();
    let mut held = Vec::new();
    while let Some(front) = values.next() {
        held.push(front);
        held.extend(values.next_back());
    }
    assert_eq!(held.len(), 33);
    for v in held {
        v.push('!');
    }
    assert!(map.values().all(|v| v.ends_with('!')));
    assert_eq!(map[&5], "5!");
}

#[test]
fn values_mut_reversed_collect_then_write() {
    let mut map = AvlTreeMap::from([(1, 10), (2, 20), (3, 30)]);
    let held: Vec<&mut i32> = map.values_mut().rev().collect();
    for (i, v) in held.into_iter().enumerate() {
        *v += i32::try_from(i).unwrap();
    }
    assert_eq!(map.values().copied().collect::<Vec<_>>(), [12, 21, 30]);
}

// ─── Borrowed lookups and range removal ──────────────────────────────────────

#[test]
fn string_keys_are_found_by_str() {
    let mut map: AvlTreeMap<String, u32> = ["delta", "alpha", "charlie"].into_iter().map(|s| (s.to_owned(), 0)).collect();
    *map.get_mut("alpha").unwrap() += 1;
    assert_eq!(map.get("alpha"), Some(&1));
    assert!(map.contains_key("charlie"));
    assert_eq!(map["delta"], 0);
    assert_eq!(map.lower_bound("b").key().map(String::as_str), Some("charlie"));
    assert_eq!(map.range::<str, _>((Bound::Included("b"), Bound::Unbounded)).count(), 2);
    assert_eq!(map.remove("delta"), Some(0));
    assert_eq!(map.try_get("delta"), Err(Error::KeyNotFound));
}

#[test]
fn remove_range_with_open_ends() {
    let mut map: AvlTreeMap<i32, ()> = (0..100).map(|k| (k, ())).collect();
    assert_eq!(map.remove_range(..10), 10);
    assert_eq!(map.remove_range(90..), 10);
    assert_eq!(map.remove_range(40..40), 0);
    assert_eq!(map.remove_range((Bound::Excluded(49), Bound::Included(59))), 10);
    assert_eq!(map.len(), 70);
    assert_eq!(map.first_key_value(), Some((&10, &())));
    assert_eq!(map.range(49..=60).map(|(k, _)| *k).collect::<Vec<_>>(), [49, 60]);
}

#[test]
#[should_panic(expected = "range start is greater than range end")]
fn remove_range_with_inverted_bounds_panics() {
    let mut map = AvlTreeMap::from([(1, 1), (2, 2)]);
    map.remove_range(2..1);
}

// ─── Overwrite and comparator behaviour ──────────────────────────────────────

#[test]
fn reinsert_changes_only_the_value() {
    let mut map: AvlTreeMap<i32, &str> = (0..100).map(|k| (k, "old")).collect();
    let height = map.height();

    for k in 0..100 {
        assert_eq!(map.insert(k, "new"), Some("old"));
    }

    assert_eq!(map.len(), 100);
    assert_eq!(map.height(), height);
    assert!(map.values().all(|v| *v == "new"));
}

#[test]
fn insert_cursor_reports_novelty() {
    let mut map = AvlTreeMap::new();
    let (cursor, inserted) = map.insert_cursor(5, 'a');
    assert!(inserted);
    assert_eq!(cursor.key(), Some(&5));

    let (mut cursor, inserted) = map.insert_cursor(5, 'b');
    assert!(!inserted);
    assert_eq!(cursor.value_mut(), Some(&mut 'b'));
}

#[test]
fn reversed_order_iterates_descending() {
    let map: AvlTreeMap<i32, (), Reversed> = (0..10).map(|k| (k, ())).collect();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), (0..10).rev().collect::<Vec<_>>());
    assert_eq!(map.first_key_value(), Some((&9, &())));
}

#[test]
fn insert_then_erase_everything_yields_fresh_map() {
    let mut map: AvlTreeMap<i32, i32> = (0..500).map(|k| (k * 7 % 500, k)).collect();
    for k in 0..500 {
        assert_eq!(map.erase(&k), 1);
    }
    assert_eq!(map, AvlTreeMap::new());
    assert_eq!(map.height(), 0);
    assert_eq!(map.cursor_front(), map.cursor_end());
}

#[test]
fn try_get_mut_reports_missing_key() {
    let mut map = AvlTreeMap::from([(1, 1)]);
    *map.try_get_mut(&1).unwrap() += 1;
    assert_eq!(map[&1], 2);
    assert_eq!(map.try_get_mut(&2), Err(Error::KeyNotFound));
}

// ─── Invalid range bounds panic tests ─────────────────────────────────────────

/// Tests that range with start > end panics just like BTreeMap.
#[test]
#[should_panic(expected = "range start is greater than range end")]
fn range_start_greater_than_end_panics() {
    let map: AvlTreeMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _: Vec<_> = map.range((Bound::Included(5), Bound::Included(3))).collect();
}

/// Tests that range with (Excluded(x), Excluded(x)) for same x panics.
#[test]
#[should_panic(expected = "range start is greater than range end")]
fn range_excluded_excluded_same_bound_panics() {
    let map: AvlTreeMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _: Vec<_> = map.range((Bound::Excluded(2), Bound::Excluded(2))).collect();
}

// ─── Sentinel and Index<&K> panic tests ───────────────────────────────────────

#[test]
#[should_panic(expected = "`Cursor::move_next()` - cursor is at the end!")]
fn stepping_past_end_panics() {
    let map = AvlTreeMap::from([(1, 1)]);
    let mut cursor = map.cursor_front();
    cursor.move_next();
    cursor.move_next();
}

#[test]
#[should_panic(expected = "`CursorMut::move_next()` - cursor is at the end!")]
fn stepping_mutable_cursor_past_end_panics() {
    let mut map = AvlTreeMap::from([(1, 1)]);
    map.find_mut(&2).move_next();
}

/// Tests that Index<&K> panics for missing key on non-empty map.
#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_key_panics() {
    let map: AvlTreeMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _ = map[&999];
}

/// Tests that Index<&K> panics for key that was removed.
#[test]
#[should_panic(expected = "no entry found for key")]
fn index_removed_key_panics() {
    let mut map: AvlTreeMap<i32, i32> = [(1, 1), (2, 2)].into_iter().collect();
    map.remove(&1);
    let _ = map[&1];
}
