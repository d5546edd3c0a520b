use avl_tree_map::AvlTreeMap;
use pretty_assertions::assert_eq;

fn pairs(items: &[(i64, &'static str)]) -> AvlTreeMap<i64, &'static str> {
    items.iter().copied().collect()
}

// ─── Documented examples ─────────────────────────────────────────────────────

#[test]
fn union_keeps_left_value_on_collision() {
    let a = pairs(&[(1, "x"), (2, "y")]);
    let b = pairs(&[(2, "z"), (3, "w")]);
    assert_eq!(a.union(&b), pairs(&[(1, "x"), (2, "y"), (3, "w")]));
    assert_eq!(b.union(&a), pairs(&[(1, "x"), (2, "z"), (3, "w")]));
}

#[test]
fn intersection_keeps_common_keys_with_left_values() {
    let a = pairs(&[(1, "x"), (2, "y")]);
    let b = pairs(&[(2, "z"), (3, "w")]);
    assert_eq!(a.intersection(&b), pairs(&[(2, "y")]));
}

#[test]
fn complement_is_symmetric_difference() {
    let a = pairs(&[(1, "x"), (2, "y")]);
    let b = pairs(&[(2, "z"), (3, "w")]);
    assert_eq!(a.complement(&b), pairs(&[(1, "x"), (3, "w")]));
    assert_eq!(b.complement(&a), pairs(&[(1, "x"), (3, "w")]));
}

// ─── Larger operands ─────────────────────────────────────────────────────────

#[test]
fn combinators_on_interleaved_ranges() {
    let evens: AvlTreeMap<i64, i64> = (0..1_000).step_by(2).map(|k| (k, 0)).collect();
    let thirds: AvlTreeMap<i64, i64> = (0..1_000).step_by(3).map(|k| (k, 1)).collect();

    let union = evens.union(&thirds);
    assert!(union.keys().all(|k| k % 2 == 0 || k % 3 == 0));
    assert_eq!(union.len(), 500 + 334 - 167);
    assert_eq!(union[&6], 0);
    assert_eq!(union[&9], 1);

    let intersection = evens.intersection(&thirds);
    assert!(intersection.keys().copied().eq((0..1_000).step_by(6)));

    let complement = evens.complement(&thirds);
    assert!(complement.keys().all(|k| (k % 2 == 0) != (k % 3 == 0)));
    assert_eq!(complement.len(), union.len() - intersection.len());
}

#[test]
fn self_combinations() {
    let a: AvlTreeMap<i64, i64> = (0..64).map(|k| (k, k)).collect();
    assert_eq!(a.union(&a), a);
    assert_eq!(a.intersection(&a), a);
    assert!(a.complement(&a).is_empty());
}
