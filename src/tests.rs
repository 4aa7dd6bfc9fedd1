use std::{ops::Range, prelude::v1::*, vec};

use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

fn keys_of(tree: &SplayTree<TestNode>) -> Vec<u32> {
    tree.iter().map(|n| n.key).collect()
}

fn insert_find_all(keys: &[u32]) {
    let mut tree: SplayTree<TestNode> = SplayTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key)).unwrap();
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);

        let found = tree.find(key).expect("item not found");
        assert_eq!(&found.key, key);
        assert_eq!(tree.root, Some(node));
        tree.assert_invariants();
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: SplayTree<TestNode> = SplayTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key)).unwrap();
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        let removed = unsafe { tree.remove_node(node) };
        assert_eq!(&removed.key, key);
        tree.assert_invariants();
    }

    for &key in keys {
        tree.insert(TestNode::new(key)).unwrap();
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let removed = tree.remove(key).expect("item not found");
        assert_eq!(&removed.key, key);
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

#[test]
fn unique_insert_in_order() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for key in [50, 30, 70, 20, 40] {
        tree.insert(TestNode::new(key)).unwrap();
    }

    assert!(tree.validate());
    assert_eq!(keys_of(&tree), vec![20, 30, 40, 50, 70]);
    assert_eq!(tree.len(), 5);
}

#[test]
fn equal_keys_pop_in_insertion_order() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for id in 0..3 {
        tree.insert_multi(TestNode::with_id(1, id)).unwrap();
    }

    let popped: Vec<usize> = core::iter::from_fn(|| tree.pop_first())
        .map(|n| n.id)
        .collect();
    assert_eq!(popped, vec![0, 1, 2]);
    assert!(tree.is_empty());
}

#[test]
fn splay_brings_neighbour_to_root() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for key in [10, 60, 30, 90, 20, 80, 40] {
        tree.insert(TestNode::new(key)).unwrap();
    }

    for probe in 0..100 {
        let hit = tree.find(&probe).is_some();
        let root = unsafe { tree.root.unwrap().as_ref().key };
        tree.assert_invariants();

        if hit {
            assert_eq!(root, probe);
            continue;
        }

        let below = keys_of(&tree).into_iter().filter(|&k| k < probe).max();
        let above = keys_of(&tree).into_iter().filter(|&k| k > probe).min();
        assert!(
            Some(root) == below || Some(root) == above,
            "probe {probe}: root {root} is not adjacent"
        );
    }
}

#[test]
fn duplicate_promotion_keeps_shape() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for (id, key) in [5, 2, 8, 5, 5, 1, 9].into_iter().enumerate() {
        tree.insert_multi(TestNode::with_id(key, id)).unwrap();
        tree.assert_invariants();
    }

    // The occupant of 5 goes, and its oldest duplicate takes its place.
    let removed = tree.remove(&5).unwrap();
    assert_eq!(removed.id, 0);
    assert_eq!(tree.find(&5).map(|n| n.id), Some(3));
    tree.assert_invariants();

    let entries: Vec<(u32, usize)> = tree.iter().map(|n| (n.key, n.id)).collect();
    assert_eq!(
        entries,
        vec![(1, 5), (2, 1), (5, 3), (5, 4), (8, 2), (9, 6)]
    );

    let reversed: Vec<usize> = tree.iter().rev().map(|n| n.id).collect();
    assert_eq!(reversed, vec![6, 2, 4, 3, 1, 5]);
}

#[test]
fn successor_and_predecessor_walk_groups() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for (id, key) in [3, 1, 3, 3, 7].into_iter().enumerate() {
        tree.insert_multi(TestNode::with_id(key, id)).unwrap();
    }

    let mut forward = Vec::new();
    let mut cur = tree.cursor_first().get();
    while let Some(node) = cur {
        forward.push(node.id);
        cur = unsafe { tree.successor(node) }.map(Pin::get_ref);
    }
    assert_eq!(forward, vec![1, 0, 2, 3, 4]);

    let mut backward = Vec::new();
    let mut cur = tree.cursor_last().get();
    while let Some(node) = cur {
        backward.push(node.id);
        cur = unsafe { tree.predecessor(node) }.map(Pin::get_ref);
    }
    assert_eq!(backward, vec![4, 3, 2, 0, 1]);
}

#[test]
fn erase_and_reinsert_preserves_contents() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    let mut ptrs = Vec::new();
    for (id, key) in [4, 4, 2, 9, 4, 2].into_iter().enumerate() {
        ptrs.push(tree.insert_multi(TestNode::with_id(key, id)).unwrap());
    }

    let mut before: Vec<(u32, usize)> = tree.iter().map(|n| (n.key, n.id)).collect();
    before.sort_unstable();

    for ptr in ptrs {
        let node = unsafe { tree.remove_node(ptr) };
        tree.assert_invariants();
        tree.insert_multi(node).unwrap();
        tree.assert_invariants();
    }

    let mut after: Vec<(u32, usize)> = tree.iter().map(|n| (n.key, n.id)).collect();
    after.sort_unstable();
    assert_eq!(before, after);
}

#[test]
fn linked_node_is_refused() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    let mut other: SplayTree<TestNode> = SplayTree::new();

    let mut node = TestNode::new(1);
    // Fake a linked element without handing it to a tree.
    node.links.set_role(Role::Occupant(TreeLinks::new(None)));

    let err = other.insert_multi(node).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyLinked);

    let mut node = err.into_inner();
    node.links.clear();
    tree.insert(node).unwrap();
    assert!(other.is_empty());
    assert_eq!(tree.len(), 1);
}

#[test]
fn clear_with_visits_everything() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for (id, key) in [6, 6, 3, 6, 1].into_iter().enumerate() {
        tree.insert_multi(TestNode::with_id(key, id)).unwrap();
    }

    let mut seen = Vec::new();
    tree.clear_with(|node| {
        assert!(!node.links.is_linked());
        seen.push(node.id);
    });

    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert!(tree.is_empty());
    assert!(tree.validate());
}

#[test]
fn check_reports_length_mismatch() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    tree.insert(TestNode::new(1)).unwrap();
    tree.insert(TestNode::new(2)).unwrap();

    tree.len += 1;
    assert_eq!(
        tree.check(),
        Err(Violation::Length {
            tracked: 3,
            counted: 2
        })
    );
    tree.len -= 1;
    assert_eq!(tree.check(), Ok(()));
}

#[test]
fn check_reports_misordered_key() {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for key in [2, 4, 6, 8] {
        tree.insert(TestNode::new(key)).unwrap();
    }

    let six = tree.get_raw(&6).unwrap();
    unsafe { (*six.as_ptr()).key = 9 };
    assert_eq!(tree.check(), Err(Violation::KeyOrder));

    unsafe { (*six.as_ptr()).key = 6 };
    assert_eq!(tree.check(), Ok(()));
}

#[test]
#[cfg_attr(miri, ignore)]
fn validate_long_spine() {
    const N: u32 = 100_000;

    // Ascending insertion leaves every earlier element on the root's left spine.
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    for key in 0..N {
        tree.insert(TestNode::new(key)).unwrap();
    }

    assert!(tree.validate());
    assert_eq!(tree.len(), N as usize);
    assert_eq!(tree.pop_first().map(|n| n.key), Some(0));
    assert!(tree.validate());
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn multiset_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_multiset_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        keys in proptest::collection::vec(0u32..16, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(keys, ops);
    }

    #[test]
    fn heap_equivalence(
        max in proptest::bool::ANY,
        ops in proptest::collection::vec(model::heap_op_strategy(), FUZZ_RANGE),
    ) {
        let order = if max { pairing::Order::Max } else { pairing::Order::Min };
        model::run_heap_equivalence(order, ops);
    }
}
