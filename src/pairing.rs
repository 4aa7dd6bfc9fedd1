//! An intrusive pairing heap.
//!
//! The heap is a forest of multi-way trees kept in heap order. Every node owns a *child ring*: a
//! circular doubly linked list of its children, with the parent pointing at the youngest child.
//! The root is the only node without a parent and is always alone in its ring.
//!
//! Everything is built from two primitives. `merge` links the loser of two roots under the winner
//! and `cut_child` detaches a subtree from its parent. Pushing is one merge; popping pairs the
//! root's children off and merges the pairs back together.

use core::{cell::UnsafeCell, fmt, marker::PhantomPinned, mem, pin::Pin, ptr::NonNull};

use cordyceps::Linked;

use crate::{ErrorKind, InsertError, Link, Violation};

/// An element that can be stored in a [`PairingHeap`].
pub trait HeapNode<L>: Linked<L> {
    type Priority: Ord + fmt::Debug;

    fn priority(&self) -> &Self::Priority;
}

/// The direction of a [`PairingHeap`]'s ordering.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// The element with the lowest priority is at the front.
    #[default]
    Min,
    /// The element with the highest priority is at the front.
    Max,
}

/// An intrusive pairing heap.
///
/// Pushing and peeking take O(1) time. Popping, erasing and updating take O(log(n)) amortized
/// time, except moving an element toward the front, which is cheaper.
pub struct PairingHeap<T>
where
    T: HeapNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
    order: Order,
}

/// The links embedded in every element of a [`PairingHeap`].
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    // Youngest child. Its `prev` is the oldest.
    child: Link<T>,
    // `None` while the element is not in a heap.
    siblings: Option<Siblings<T>>,
    _unpin: PhantomPinned,
}

struct Siblings<T: ?Sized> {
    next: NonNull<T>,
    prev: NonNull<T>,
}

impl<T: ?Sized> Clone for Siblings<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Siblings<T> {}

#[inline]
unsafe fn links<'a, T>(node: NonNull<T>) -> &'a Links<T>
where
    T: HeapNode<Links<T>> + ?Sized,
{
    unsafe { T::links(node).as_ref() }
}

#[inline]
unsafe fn links_mut<'a, T>(node: NonNull<T>) -> &'a mut Links<T>
where
    T: HeapNode<Links<T>> + ?Sized,
{
    unsafe { T::links(node).as_mut() }
}

impl<T> PairingHeap<T>
where
    T: HeapNode<Links<T>> + ?Sized,
{
    /// Returns a new empty heap ordered by `order`.
    pub const fn new(order: Order) -> PairingHeap<T> {
        PairingHeap {
            root: None,
            len: 0,
            order,
        }
    }

    /// Returns a new empty heap with the lowest priority at the front.
    pub const fn min() -> PairingHeap<T> {
        Self::new(Order::Min)
    }

    /// Returns a new empty heap with the highest priority at the front.
    pub const fn max() -> PairingHeap<T> {
        Self::new(Order::Max)
    }

    pub const fn order(&self) -> Order {
        self.order
    }

    /// Returns `true` if the heap contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements in the heap.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Pushes `item` into the heap.
    ///
    /// This only fails if `item` is already linked into a container, in which case it is handed
    /// back inside the error.
    pub fn push(&mut self, item: T::Handle) -> Result<NonNull<T>, InsertError<T::Handle>> {
        let ptr = T::into_ptr(item);

        unsafe {
            if links(ptr).is_linked() {
                return Err(InsertError::new(ErrorKind::AlreadyLinked, T::from_ptr(ptr)));
            }

            links_mut(ptr).set_child(None);
            self.make_singleton(ptr);
            self.meld(ptr);
        }

        self.len += 1;
        Ok(ptr)
    }

    /// Returns the element at the front of the heap.
    pub fn peek(&self) -> Option<Pin<&T>> {
        let root = self.root?;
        unsafe { Some(Pin::new_unchecked(root.as_ref())) }
    }

    /// Removes and returns the element at the front of the heap.
    pub fn pop(&mut self) -> Option<T::Handle> {
        let root = self.root?;

        unsafe {
            self.root = self.delete_min(root);
            links_mut(root).clear();
        }

        self.len -= 1;
        unsafe { Some(T::from_ptr(root)) }
    }

    /// Removes an arbitrary element from the heap.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`, and not of any other heap.
    pub unsafe fn erase(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            if self.root == Some(node) {
                self.root = self.delete_min(node);
            } else {
                self.cut_child(node);
                if let Some(sub) = self.delete_min(node) {
                    self.meld(sub);
                }
            }

            links_mut(node).clear();
            self.len -= 1;
            T::from_ptr(node)
        }
    }

    /// Raises the priority of `node` with `f`, then restores heap order.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`. `f` must not move out of the element, touch its links,
    /// or lower its priority.
    pub unsafe fn increase<F>(&mut self, node: NonNull<T>, f: F)
    where
        F: FnOnce(Pin<&mut T>),
    {
        unsafe {
            Self::modify(node, f);
            match self.order {
                Order::Max => self.sift_front(node),
                Order::Min => self.sift_back(node),
            }
        }
    }

    /// Lowers the priority of `node` with `f`, then restores heap order.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`. `f` must not move out of the element, touch its links,
    /// or raise its priority.
    pub unsafe fn decrease<F>(&mut self, node: NonNull<T>, f: F)
    where
        F: FnOnce(Pin<&mut T>),
    {
        unsafe {
            Self::modify(node, f);
            match self.order {
                Order::Min => self.sift_front(node),
                Order::Max => self.sift_back(node),
            }
        }
    }

    /// Changes the priority of `node` with `f` in either direction, then restores heap order.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`. `f` must not move out of the element or touch its
    /// links.
    pub unsafe fn update<F>(&mut self, node: NonNull<T>, f: F)
    where
        F: FnOnce(Pin<&mut T>),
    {
        unsafe {
            Self::modify(node, f);

            // If no child beats `node`, its subtree is still in order and only the edge to its
            // parent can be broken.
            if self.any_child_beats(node) {
                self.sift_back(node);
            } else {
                self.sift_front(node);
            }
        }
    }

    /// Returns `true` if every structural invariant of the heap holds.
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Walks the whole heap and reports the first broken invariant, if any.
    ///
    /// The walk follows parent and sibling links instead of recursing, so a long chain of
    /// children does not exhaust the stack.
    pub fn check(&self) -> Result<(), Violation> {
        let Some(root) = self.root else {
            return self.check_len(0);
        };

        unsafe {
            let Some(siblings) = links(root).siblings() else {
                return Err(Violation::Role);
            };

            if siblings.next != root || siblings.prev != root {
                return Err(Violation::Root);
            }

            if links(root).parent().is_some() {
                return Err(Violation::Root);
            }

            // Pre-order walk. Each node's child ring is checked before the walk enters it, so
            // the parent and sibling links used to climb back out are already known to be sound.
            let mut counted = 1;
            let mut cur = root;

            'visit: loop {
                counted += self.check_children(cur)?;
                if counted > self.len {
                    return self.check_len(counted);
                }

                if let Some(child) = links(cur).child() {
                    cur = child;
                    continue;
                }

                while let Some(parent) = links(cur).parent() {
                    let next = links(cur).next();
                    if links(parent).child() != Some(next) {
                        cur = next;
                        continue 'visit;
                    }

                    cur = parent;
                }

                return self.check_len(counted);
            }
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        if let Err(violation) = self.check() {
            panic!("pairing heap invariant violated: {violation}");
        }
    }

    fn check_len(&self, counted: usize) -> Result<(), Violation> {
        if counted != self.len {
            return Err(Violation::Length {
                tracked: self.len,
                counted,
            });
        }

        Ok(())
    }

    // Checks the child ring of `node`, returning the number of children.
    unsafe fn check_children(&self, node: NonNull<T>) -> Result<usize, Violation> {
        unsafe {
            let Some(head) = links(node).child() else {
                return Ok(0);
            };

            let mut count = 0;
            let mut cur = head;

            loop {
                let Some(siblings) = links(cur).siblings() else {
                    return Err(Violation::Role);
                };

                if links(cur).parent() != Some(node) {
                    return Err(Violation::ParentLink);
                }

                if self.beats(cur, node) {
                    return Err(Violation::HeapOrder);
                }

                match links(siblings.next).siblings() {
                    Some(next) if next.prev == cur => (),
                    _ => return Err(Violation::SiblingRing),
                }

                count += 1;
                if count > self.len {
                    return Err(Violation::SiblingRing);
                }

                cur = siblings.next;
                if cur == head {
                    return Ok(count);
                }
            }
        }
    }

    /// Clears the heap, removing all elements.
    pub fn clear(&mut self) {
        self.clear_with(drop);
    }

    /// Clears the heap, passing every removed element to `f` in heap order.
    pub fn clear_with(&mut self, mut f: impl FnMut(T::Handle)) {
        while let Some(item) = self.pop() {
            f(item);
        }

        debug_assert!(self.root.is_none());
    }

    // Repair ==================================================================

    unsafe fn modify<F>(mut node: NonNull<T>, f: F)
    where
        F: FnOnce(Pin<&mut T>),
    {
        unsafe { f(Pin::new_unchecked(node.as_mut())) }
    }

    // Restores order after `node` moved toward the front. Its subtree is still in order, so
    // cutting it loose and merging it into the root suffices.
    unsafe fn sift_front(&mut self, node: NonNull<T>) {
        unsafe {
            let Some(parent) = links(node).parent() else {
                debug_assert_eq!(self.root, Some(node));
                return;
            };

            if !self.beats(node, parent) {
                return;
            }

            self.cut_child(node);
            self.meld(node);
        }
    }

    // Restores order after `node` moved away from the front. Its children may now beat it, so
    // they are paired off into a sub-heap that rejoins the root separately from `node`.
    unsafe fn sift_back(&mut self, node: NonNull<T>) {
        unsafe {
            if self.root == Some(node) {
                self.root = self.delete_min(node);
            } else {
                self.cut_child(node);
                if let Some(sub) = self.delete_min(node) {
                    self.meld(sub);
                }
            }

            self.meld(node);
        }
    }

    unsafe fn any_child_beats(&self, node: NonNull<T>) -> bool {
        unsafe { Self::children(node).any(|child| self.beats(child, node)) }
    }

    #[cfg(any(test, feature = "alloc"))]
    pub(crate) fn root_raw(&self) -> Link<T> {
        self.root
    }

    // Returns the children of `node`, youngest first.
    pub(crate) unsafe fn children(node: NonNull<T>) -> impl Iterator<Item = NonNull<T>> {
        let head = unsafe { links(node).child() };
        let mut opt_cur = head;

        core::iter::from_fn(move || {
            let cur = opt_cur?;
            let next = unsafe { links(cur).next() };
            opt_cur = (Some(next) != head).then_some(next);
            Some(cur)
        })
    }

    // Primitives ==============================================================

    // Returns `true` if `a` must be closer to the front than `b`.
    #[inline]
    unsafe fn beats(&self, a: NonNull<T>, b: NonNull<T>) -> bool {
        let (a, b) = unsafe { (a.as_ref().priority(), b.as_ref().priority()) };

        match self.order {
            Order::Min => a < b,
            Order::Max => a > b,
        }
    }

    // Merges the lone root `node` into the heap.
    #[inline]
    unsafe fn meld(&mut self, node: NonNull<T>) {
        let root = match self.root {
            Some(root) => unsafe { self.merge(root, node) },
            None => node,
        };

        self.root = Some(root);
    }

    // Merges two lone roots and returns the winner. `old` wins ties.
    unsafe fn merge(&self, old: NonNull<T>, new: NonNull<T>) -> NonNull<T> {
        unsafe {
            if self.beats(new, old) {
                self.link_child(new, old);
                new
            } else {
                self.link_child(old, new);
                old
            }
        }
    }

    // Makes the lone root `child` the youngest child of `parent`.
    unsafe fn link_child(&self, parent: NonNull<T>, child: NonNull<T>) {
        unsafe {
            if let Some(head) = links(parent).child() {
                let tail = links(head).prev();
                links_mut(child).set_siblings(head, tail);
                links_mut(tail).set_next(child);
                links_mut(head).set_prev(child);
            }

            links_mut(parent).set_child(Some(child));
            links_mut(child).set_parent(Some(parent));
        }
    }

    // Detaches `node` and its subtree from its parent's child ring, leaving it a lone root.
    unsafe fn cut_child(&self, node: NonNull<T>) {
        unsafe {
            let Siblings { next, prev } = links(node).siblings_unchecked();
            let parent = links(node).parent();

            if next == node {
                if let Some(parent) = parent {
                    links_mut(parent).set_child(None);
                }
            } else {
                links_mut(prev).set_next(next);
                links_mut(next).set_prev(prev);

                if let Some(parent) = parent {
                    if links(parent).child() == Some(node) {
                        links_mut(parent).set_child(Some(prev));
                    }
                }
            }

            self.make_singleton(node);
        }
    }

    // Detaches the children of `node` and combines them into a single tree, returning its root.
    //
    // Children are taken two at a time from the oldest, each pair is merged, and the pair's
    // winner is merged into the accumulated result. An odd child out is merged in last.
    unsafe fn delete_min(&self, node: NonNull<T>) -> Link<T> {
        unsafe {
            let head = links_mut(node).set_child(None)?;
            let mut acc: Link<T> = None;
            let mut cur = links(head).prev();

            loop {
                let first = cur;
                let rest = links(first).prev();
                self.make_singleton(first);

                if first == head {
                    acc = Some(self.merge_opt(acc, first));
                    return acc;
                }

                let second = rest;
                let rest = links(second).prev();
                self.make_singleton(second);

                let pair = self.merge(first, second);
                acc = Some(self.merge_opt(acc, pair));

                if second == head {
                    return acc;
                }

                cur = rest;
            }
        }
    }

    #[inline]
    unsafe fn merge_opt(&self, acc: Link<T>, node: NonNull<T>) -> NonNull<T> {
        match acc {
            Some(acc) => unsafe { self.merge(acc, node) },
            None => node,
        }
    }

    // Resets the sibling ring of `node` to itself and forgets its parent. Children are kept.
    #[inline]
    unsafe fn make_singleton(&self, node: NonNull<T>) {
        unsafe {
            let links = links_mut(node);
            links.set_siblings(node, node);
            links.set_parent(None);
        }
    }
}

impl<T> Default for PairingHeap<T>
where
    T: HeapNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::min()
    }
}

impl<T> Drop for PairingHeap<T>
where
    T: HeapNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for PairingHeap<T>
where
    T: HeapNode<Links<T>> + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingHeap")
            .field("order", &self.order)
            .field("len", &self.len)
            .field("front", &self.peek())
            .finish()
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                child: None,
                siblings: None,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns `true` if the element owning these links is currently in a heap.
    pub fn is_linked(&self) -> bool {
        self.siblings().is_some()
    }

    #[inline]
    fn inner(&self) -> &LinksInner<T> {
        unsafe { &*self.inner.get() }
    }

    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.child = None;
        inner.siblings = None;
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        self.inner().parent
    }

    #[inline]
    fn child(&self) -> Link<T> {
        self.inner().child
    }

    #[inline]
    fn siblings(&self) -> Option<Siblings<T>> {
        self.inner().siblings
    }

    #[inline]
    fn siblings_unchecked(&self) -> Siblings<T> {
        match self.siblings() {
            Some(siblings) => siblings,
            None => unreachable!("links do not belong to a heap element"),
        }
    }

    #[inline]
    fn next(&self) -> NonNull<T> {
        self.siblings_unchecked().next
    }

    #[inline]
    fn prev(&self) -> NonNull<T> {
        self.siblings_unchecked().prev
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().child, child)
    }

    #[inline]
    fn set_siblings(&mut self, next: NonNull<T>, prev: NonNull<T>) {
        self.inner.get_mut().siblings = Some(Siblings { next, prev });
    }

    #[inline]
    fn set_next(&mut self, next: NonNull<T>) {
        let prev = self.prev();
        self.set_siblings(next, prev);
    }

    #[inline]
    fn set_prev(&mut self, prev: NonNull<T>) {
        let next = self.next();
        self.set_siblings(next, prev);
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner();
        match inner.siblings {
            None => f.write_str("Free"),
            Some(siblings) => f
                .debug_struct("Links")
                .field("parent", &inner.parent)
                .field("child", &inner.child)
                .field("next", &siblings.next)
                .field("prev", &siblings.prev)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{prelude::v1::*, vec};

    use super::*;
    use crate::model::HeapEntry;

    fn drain(heap: &mut PairingHeap<HeapEntry>) -> Vec<u32> {
        core::iter::from_fn(|| heap.pop()).map(|e| e.priority).collect()
    }

    #[test]
    fn min_heap_pops_in_order() {
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::min();
        for p in [5, 3, 8, 1, 9] {
            heap.push(HeapEntry::new(p)).unwrap();
        }

        let popped: Vec<u32> = (0..4).map(|_| heap.pop().unwrap().priority).collect();
        assert_eq!(popped, vec![1, 3, 5, 8]);
        assert_eq!(heap.peek().map(|e| e.priority), Some(9));
        assert_eq!(heap.len(), 1);
        assert!(heap.validate());
    }

    #[test]
    fn decrease_moves_to_front() {
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::min();
        heap.push(HeapEntry::new(10)).unwrap();
        heap.push(HeapEntry::new(20)).unwrap();
        let thirty = heap.push(HeapEntry::new(30)).unwrap();

        unsafe { heap.decrease(thirty, |e| e.get_unchecked_mut().priority = 5) };

        assert_eq!(heap.peek().map(|e| e.priority), Some(5));
        assert!(heap.validate());
        assert_eq!(drain(&mut heap), vec![5, 10, 20]);
    }

    #[test]
    fn max_heap_updates_both_ways() {
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::max();
        heap.push(HeapEntry::new(70)).unwrap();
        let nodes: Vec<_> = [40, 10, 30, 60, 20, 50]
            .into_iter()
            .map(|p| heap.push(HeapEntry::new(p)).unwrap())
            .collect();

        // Pop once so the remaining elements form a deeper tree.
        assert_eq!(heap.pop().map(|e| e.priority), Some(70));

        unsafe {
            heap.increase(nodes[1], |e| e.get_unchecked_mut().priority = 65);
            heap.assert_invariants();
            heap.decrease(nodes[3], |e| e.get_unchecked_mut().priority = 5);
            heap.assert_invariants();
            heap.update(nodes[0], |e| e.get_unchecked_mut().priority = 15);
            heap.assert_invariants();
            heap.update(nodes[4], |e| e.get_unchecked_mut().priority = 55);
            heap.assert_invariants();
        }

        // 30 and 50 are untouched.
        assert_eq!(drain(&mut heap), vec![65, 55, 50, 30, 15, 5]);
    }

    #[test]
    fn check_catches_corruption() {
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::min();
        heap.push(HeapEntry::new(1)).unwrap();
        let five = heap.push(HeapEntry::new(5)).unwrap();
        let six = heap.push(HeapEntry::new(6)).unwrap();
        assert_eq!(heap.check(), Ok(()));

        unsafe { (*five.as_ptr()).priority = 0 };
        assert_eq!(heap.check(), Err(Violation::HeapOrder));
        unsafe { (*five.as_ptr()).priority = 5 };

        // Point the youngest child's `next` at itself, orphaning its sibling.
        let inner = unsafe { six.as_ref().links.inner.get() };
        let saved = unsafe { (*inner).siblings };
        unsafe {
            (*inner).siblings = Some(Siblings {
                next: six,
                prev: five,
            })
        };
        assert_eq!(heap.check(), Err(Violation::SiblingRing));

        unsafe { (*inner).siblings = saved };
        assert_eq!(heap.check(), Ok(()));
        assert_eq!(drain(&mut heap), vec![1, 5, 6]);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn validate_long_chain() {
        const N: u32 = 100_000;

        // Each push beats the root, which leaves a single chain of only children.
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::min();
        for p in (0..N).rev() {
            heap.push(HeapEntry::new(p)).unwrap();
        }

        assert!(heap.validate());
        assert_eq!(heap.len(), N as usize);
        assert_eq!(heap.pop().map(|e| e.priority), Some(0));
        assert!(heap.validate());
    }

    #[test]
    fn erase_interior_and_root() {
        let mut heap: PairingHeap<HeapEntry> = PairingHeap::min();
        let nodes: Vec<_> = (1..=9)
            .rev()
            .map(|p| heap.push(HeapEntry::new(p)).unwrap())
            .collect();

        // 1 is the root; 4 sits somewhere below it.
        let erased = unsafe { heap.erase(nodes[5]) };
        assert_eq!(erased.priority, 4);
        heap.assert_invariants();

        let erased = unsafe { heap.erase(nodes[8]) };
        assert_eq!(erased.priority, 1);
        heap.assert_invariants();

        assert_eq!(drain(&mut heap), vec![2, 3, 5, 6, 7, 8, 9]);
    }

    #[derive(Debug)]
    #[repr(C)]
    struct Slot {
        links: Links<Slot>,
        priority: u32,
    }

    unsafe impl Linked<Links<Slot>> for Slot {
        type Handle = NonNull<Slot>;

        fn into_ptr(r: Self::Handle) -> NonNull<Self> {
            r
        }

        unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
            ptr
        }

        unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Slot>> {
            ptr.cast()
        }
    }

    impl HeapNode<Links<Slot>> for Slot {
        type Priority = u32;

        fn priority(&self) -> &u32 {
            &self.priority
        }
    }

    #[test]
    fn caller_owned_storage() {
        let mut a = Slot {
            links: Links::new(),
            priority: 7,
        };
        let mut b = Slot {
            links: Links::new(),
            priority: 2,
        };
        let mut c = Slot {
            links: Links::new(),
            priority: 4,
        };

        let mut heap: PairingHeap<Slot> = PairingHeap::min();
        let a_ptr = NonNull::from(&mut a);
        heap.push(a_ptr).unwrap();
        let b_ptr = NonNull::from(&mut b);
        heap.push(b_ptr).unwrap();
        heap.push(NonNull::from(&mut c)).unwrap();

        let err = heap.push(b_ptr).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyLinked);
        assert_eq!(err.into_inner(), b_ptr);
        assert_eq!(heap.len(), 3);

        assert_eq!(heap.peek().map(|s| s.priority), Some(2));
        let erased = unsafe { heap.erase(a_ptr) };
        assert_eq!(erased, a_ptr);
        heap.assert_invariants();

        let mut order = Vec::new();
        heap.clear_with(|slot| order.push(unsafe { slot.as_ref().priority }));
        assert_eq!(order, vec![2, 4]);
        drop(heap);

        assert!(!a.links.is_linked());
        assert!(!b.links.is_linked());
        assert!(!c.links.is_linked());
    }
}
