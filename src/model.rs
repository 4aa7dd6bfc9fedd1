use std::{
    collections::{BTreeMap, VecDeque},
    prelude::v1::*,
    ptr::NonNull,
};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{
    pairing::{self, HeapNode, Order, PairingHeap},
    Links, SplayTree, TreeNode,
};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
    pub id: usize,
}

impl TestNode {
    pub(crate) fn new(key: u32) -> Box<TestNode> {
        Self::with_id(key, 0)
    }

    pub(crate) fn with_id(key: u32, id: usize) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
            id,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::new(Box::into_raw(r)).unwrap()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

#[derive(Debug)]
#[repr(C)]
pub struct HeapEntry {
    pub links: pairing::Links<HeapEntry>,
    pub priority: u32,
    pub id: usize,
}

impl HeapEntry {
    pub(crate) fn new(priority: u32) -> Box<HeapEntry> {
        Self::with_id(priority, 0)
    }

    pub(crate) fn with_id(priority: u32, id: usize) -> Box<HeapEntry> {
        Box::new(HeapEntry {
            links: pairing::Links::new(),
            priority,
            id,
        })
    }
}

unsafe impl Linked<pairing::Links<HeapEntry>> for HeapEntry {
    type Handle = Box<HeapEntry>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::new(Box::into_raw(r)).unwrap()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<pairing::Links<HeapEntry>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl HeapNode<pairing::Links<HeapEntry>> for HeapEntry {
    type Priority = u32;

    fn priority(&self) -> &Self::Priority {
        &self.priority
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..100,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

fn resolve(keys: &[u32], i: ItemValue) -> u32 {
    match i {
        ItemValue::Index(idx) => {
            if keys.is_empty() {
                idx as u32
            } else {
                keys[idx % keys.len()]
            }
        }
        ItemValue::Random(v) => v,
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    InsertMulti(ItemValue),
    Find(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
    Range(ItemValue, ItemValue),
    RRange(ItemValue, ItemValue),
}

impl Op {
    fn finalize(self, keys: &[u32]) -> FinalOp {
        match self {
            Op::Insert(item) => FinalOp::Insert(resolve(keys, item)),
            Op::InsertMulti(item) => FinalOp::InsertMulti(resolve(keys, item)),
            Op::Find(item) => FinalOp::Find(resolve(keys, item)),
            Op::Get(item) => FinalOp::Get(resolve(keys, item)),
            Op::Remove(item) => FinalOp::Remove(resolve(keys, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
            Op::Range(a, b) => FinalOp::Range(resolve(keys, a), resolve(keys, b)),
            Op::RRange(a, b) => FinalOp::RRange(resolve(keys, a), resolve(keys, b)),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    InsertMulti(u32),
    Find(u32),
    Get(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
    Range(u32, u32),
    RRange(u32, u32),
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::InsertMulti),
        value_strategy().prop_map(Op::Find),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
        (value_strategy(), value_strategy()).prop_map(|(a, b)| Op::Range(a, b)),
        (value_strategy(), value_strategy()).prop_map(|(a, b)| Op::RRange(a, b)),
    ]
}

/// A multiset with FIFO groups: each key maps to the ids inserted under it, oldest first.
#[derive(Default)]
struct Multiset {
    groups: BTreeMap<u32, VecDeque<usize>>,
    len: usize,
}

impl Multiset {
    fn push(&mut self, key: u32, id: usize) {
        self.groups.entry(key).or_default().push_back(id);
        self.len += 1;
    }

    fn front(&self, key: u32) -> Option<usize> {
        self.groups.get(&key).and_then(|g| g.front().copied())
    }

    fn pop(&mut self, key: u32) -> Option<usize> {
        let group = self.groups.get_mut(&key)?;
        let id = group.pop_front();
        if group.is_empty() {
            self.groups.remove(&key);
        }
        self.len -= 1;
        id
    }

    fn first_key(&self) -> Option<u32> {
        self.groups.keys().next().copied()
    }

    fn last_key(&self) -> Option<u32> {
        self.groups.keys().next_back().copied()
    }

    fn keys(&self) -> Vec<u32> {
        self.groups.keys().copied().collect()
    }

    fn ascending(&self, low: u32, high: u32) -> Vec<(u32, usize)> {
        if low > high {
            return Vec::new();
        }

        self.groups
            .range(low..=high)
            .flat_map(|(&k, ids)| ids.iter().map(move |&id| (k, id)))
            .collect()
    }

    fn entries(&self) -> Vec<(u32, usize)> {
        self.groups
            .iter()
            .flat_map(|(&k, ids)| ids.iter().map(move |&id| (k, id)))
            .collect()
    }
}

fn entry(node: &TestNode) -> (u32, usize) {
    (node.key, node.id)
}

#[allow(clippy::boxed_local)]
fn boxed_entry(node: Box<TestNode>) -> (u32, usize) {
    (node.key, node.id)
}

pub fn run_multiset_equivalence(ops: Vec<Op>) {
    let mut model = Multiset::default();
    let mut tree: SplayTree<TestNode> = SplayTree::new();

    let mut final_ops = Vec::with_capacity(ops.len());
    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&model.keys());
        final_ops.push(final_op);

        match final_op {
            FinalOp::Insert(key) => {
                let expected = match model.front(key) {
                    Some(_) => Err(op_id),
                    None => {
                        model.push(key, op_id);
                        Ok(())
                    }
                };

                let actual = tree
                    .insert(TestNode::with_id(key, op_id))
                    .map(|_| ())
                    .map_err(|err| err.into_inner().id);

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::InsertMulti(key) => {
                model.push(key, op_id);
                let node = tree
                    .insert_multi(TestNode::with_id(key, op_id))
                    .expect("insert_multi never refuses a free node");

                assert_eq!(unsafe { node.as_ref().id }, op_id);
            }

            FinalOp::Find(key) => {
                let expected = model.front(key).map(|id| (key, id));
                let actual = tree.find(&key).map(|n| entry(&n));

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let expected = model.front(key).map(|id| (key, id));
                let actual = tree.get(&key).map(|n| entry(&n));

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                let expected = model.pop(key).map(|id| (key, id));
                let actual = tree.remove(&key).map(boxed_entry);

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let expected = model
                    .first_key()
                    .and_then(|k| model.front(k).map(|id| (k, id)));
                let actual = tree.first().map(|n| entry(&n));

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let expected = model
                    .first_key()
                    .and_then(|k| model.pop(k).map(|id| (k, id)));
                let actual = tree.pop_first().map(boxed_entry);

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let expected = model
                    .last_key()
                    .and_then(|k| model.front(k).map(|id| (k, id)));
                let actual = tree.last().map(|n| entry(&n));

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let expected = model
                    .last_key()
                    .and_then(|k| model.pop(k).map(|id| (k, id)));
                let actual = tree.pop_last().map(boxed_entry);

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Range(begin, end) => {
                let expected = model.ascending(begin, end);
                let actual: Vec<_> = tree.equal_range(&begin, &end).map(entry).collect();

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::RRange(rbegin, rend) => {
                let mut expected = model.ascending(rend, rbegin);
                expected.reverse();
                let actual: Vec<_> = tree.equal_rrange(&rbegin, &rend).map(entry).collect();

                assert_eq!(expected, actual, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        tree.assert_invariants();
        assert_eq!(model.len, tree.len());

        let expected = model.entries();
        let forward: Vec<_> = tree.iter().map(entry).collect();
        assert_eq!(expected, forward);

        let mut backward: Vec<_> = tree.iter().rev().map(entry).collect();
        backward.reverse();
        assert_eq!(expected, backward);
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    RemoveCurrent,
    RemoveCurrentMovePrev,
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        Just(CursorOp::RemoveCurrent),
        Just(CursorOp::RemoveCurrentMovePrev),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub keys: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Few distinct keys, so that most groups have duplicates.
        fn key(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u8::arbitrary(u).map_or(0, |k| u32::from(k % 16))
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_keys = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let keys = core::iter::repeat_with(|| key(u))
            .take(num_keys.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput { keys, ops })
    }
}

pub fn run_cursor_equivalence(keys: Vec<u32>, ops: Vec<CursorOp>) {
    let mut tree: SplayTree<TestNode> = SplayTree::new();
    let mut vec: Vec<(u32, usize)> = keys.iter().copied().zip(0..).collect();

    for &(key, id) in &vec {
        tree.insert_multi(TestNode::with_id(key, id))
            .expect("insert_multi never refuses a free node");
    }

    // A stable sort keeps equal keys in insertion order, like the tree's duplicate groups.
    vec.sort_by_key(|&(key, _)| key);

    fn vec_curs_prev(curs: Option<usize>, len: usize) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => len.checked_sub(1),
        }
    }

    fn vec_curs_next(curs: Option<usize>, len: usize) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < len),
            None => (len != 0).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(None, vec.len());
    let mut tree_curs = tree.cursor_first_mut();

    // Check that the initial states are equivalent.
    {
        let v = vec_curs.map(|i| vec[i]);
        let t = tree_curs.get().map(entry);

        assert_eq!(v, t);
    }

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(vec_curs, vec.len());
                tree_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(vec_curs, vec.len());
                tree_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(vec_curs, vec.len()).map(|i| vec[i]);
                let t = tree_curs.peek_next().map(entry);

                assert_eq!(v, t);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(vec_curs, vec.len()).map(|i| vec[i]);
                let t = tree_curs.peek_prev().map(entry);

                assert_eq!(v, t);
            }

            CursorOp::RemoveCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                let t = tree_curs.remove_current().map(boxed_entry);

                assert_eq!(v, t);
            }

            CursorOp::RemoveCurrentMovePrev => {
                let new_v_curs = vec_curs
                    .is_some()
                    .then(|| vec_curs_prev(vec_curs, vec.len()));
                let v = vec_curs.map(|i| vec.remove(i));

                if let Some(vc) = new_v_curs {
                    vec_curs = vc;
                }

                let t = tree_curs
                    .remove_current_and_move_prev()
                    .map(boxed_entry);

                assert_eq!(v, t);
            }
        }

        let v = vec_curs.map(|i| vec[i]);
        let t = tree_curs.get().map(entry);

        assert_eq!(v, t);
    }

    drop(tree_curs);
    tree.assert_invariants();
    assert_eq!(tree.len(), vec.len());
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum HeapOp {
    Push(u32),
    Peek,
    Pop,
    Erase(usize),
    Increase(usize, u32),
    Decrease(usize, u32),
    Update(usize, u32),
}

pub fn heap_op_strategy() -> impl Strategy<Value = HeapOp> {
    proptest::prop_oneof![
        (0u32..100).prop_map(HeapOp::Push),
        Just(HeapOp::Peek),
        Just(HeapOp::Pop),
        (0usize..1000).prop_map(HeapOp::Erase),
        (0usize..1000, 0u32..50).prop_map(|(i, d)| HeapOp::Increase(i, d)),
        (0usize..1000, 0u32..50).prop_map(|(i, d)| HeapOp::Decrease(i, d)),
        (0usize..1000, 0u32..100).prop_map(|(i, p)| HeapOp::Update(i, p)),
    ]
}

struct Live {
    ptr: NonNull<HeapEntry>,
    id: usize,
    priority: u32,
}

pub fn run_heap_equivalence(order: Order, ops: Vec<HeapOp>) {
    let mut heap: PairingHeap<HeapEntry> = PairingHeap::new(order);
    let mut live: Vec<Live> = Vec::new();

    let front = |live: &[Live]| -> Option<u32> {
        let priorities = live.iter().map(|l| l.priority);
        match order {
            Order::Min => priorities.min(),
            Order::Max => priorities.max(),
        }
    };

    for (op_id, op) in ops.into_iter().enumerate() {
        match op {
            HeapOp::Push(priority) => {
                let ptr = heap
                    .push(HeapEntry::with_id(priority, op_id))
                    .expect("pushing a free node never fails");
                live.push(Live {
                    ptr,
                    id: op_id,
                    priority,
                });
            }

            HeapOp::Peek => {
                let actual = heap.peek().map(|e| e.priority);
                assert_eq!(front(&live), actual, "HeapOp #{op_id}: {op:?}");
            }

            HeapOp::Pop => {
                let expected = front(&live);
                let popped = heap.pop();
                assert_eq!(
                    expected,
                    popped.as_ref().map(|e| e.priority),
                    "HeapOp #{op_id}: {op:?}"
                );

                if let Some(popped) = popped {
                    let idx = live
                        .iter()
                        .position(|l| l.id == popped.id)
                        .expect("popped element must be live");
                    live.swap_remove(idx);
                }
            }

            HeapOp::Erase(idx) if !live.is_empty() => {
                let victim = live.swap_remove(idx % live.len());
                let erased = unsafe { heap.erase(victim.ptr) };
                assert_eq!(erased.id, victim.id, "HeapOp #{op_id}: {op:?}");
                assert!(!erased.links.is_linked());
            }

            HeapOp::Increase(idx, delta) if !live.is_empty() => {
                let i = idx % live.len();
                let target = &mut live[i];
                let priority = target.priority.saturating_add(delta);
                target.priority = priority;
                unsafe {
                    heap.increase(target.ptr, |e| e.get_unchecked_mut().priority = priority)
                };
            }

            HeapOp::Decrease(idx, delta) if !live.is_empty() => {
                let i = idx % live.len();
                let target = &mut live[i];
                let priority = target.priority.saturating_sub(delta);
                target.priority = priority;
                unsafe {
                    heap.decrease(target.ptr, |e| e.get_unchecked_mut().priority = priority)
                };
            }

            HeapOp::Update(idx, priority) if !live.is_empty() => {
                let i = idx % live.len();
                let target = &mut live[i];
                target.priority = priority;
                unsafe { heap.update(target.ptr, |e| e.get_unchecked_mut().priority = priority) };
            }

            HeapOp::Erase(_) | HeapOp::Increase(..) | HeapOp::Decrease(..) | HeapOp::Update(..) => {
            }
        }

        heap.assert_invariants();
        assert_eq!(live.len(), heap.len());
        assert_eq!(front(&live), heap.peek().map(|e| e.priority));
    }

    let mut drained = Vec::with_capacity(heap.len());
    heap.clear_with(|e| drained.push(e.priority));

    let mut expected: Vec<u32> = live.iter().map(|l| l.priority).collect();
    expected.sort_unstable();
    if order == Order::Max {
        expected.reverse();
    }
    assert_eq!(expected, drained);
}
