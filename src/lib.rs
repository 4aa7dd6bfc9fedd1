//! Intrusive self-adjusting containers: a splay tree and a pairing heap.
#![no_std]

// The splay tree is the top-down variant from Sleator and Tarjan, "Self-Adjusting Binary Search
// Trees". Every search, insertion and removal splays the visited path, which keeps the amortized
// cost of each operation at O(log(n)) even though a single operation may take O(n).
//
// Elements with equal keys are supported without disturbing the binary search tree:
// - Exactly one element per group of equal keys is a tree *occupant*. Only occupants have tree
//   links, and the search tree ordering is strict over occupants.
// - Every other element of the group is a *duplicate* hanging off the occupant in a circular,
//   doubly linked ring. The ring head is the oldest duplicate and is the only member that knows
//   the occupant.
// - Removing an occupant that has duplicates promotes the ring head into the occupant's tree
//   position in O(1), so a run of pops over equal keys costs one splay in total.
//
// Groups are consumed in insertion order: the occupant was inserted first, the ring head second,
// and new duplicates join at the tail.

// Links are compared by address only; `T: ?Sized` makes every such comparison a wide one.
#![allow(ambiguous_wide_pointer_comparisons)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

#[cfg(any(test, feature = "model"))]
extern crate std;

use core::{
    borrow::Borrow, cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not,
    pin::Pin, ptr::NonNull,
};

use cordyceps::Linked;

mod cursor;
#[cfg(any(test, feature = "alloc"))]
mod debug;
pub mod error;
mod iter;
#[cfg(any(test, feature = "alloc"))]
pub mod map;
#[cfg(any(test, feature = "model"))]
pub mod model;
pub mod pairing;
pub mod queue;
mod ring;
pub mod set;

#[cfg(test)]
mod tests;

pub use cursor::{Cursor, CursorMut};
pub use error::{ErrorKind, InsertError, Violation};
pub use iter::{Iter, Range};
#[cfg(any(test, feature = "alloc"))]
pub use map::SplayMap;
pub use pairing::{HeapNode, Order, PairingHeap};
pub use queue::SplayQueue;
pub use set::SplaySet;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive splay tree.
///
/// This is the engine shared by [`SplaySet`] (unique keys) and [`SplayQueue`] (duplicate keys).
/// Both insertion flavours may be mixed on a single tree.
pub struct SplayTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

/// The links embedded in every element of a [`SplayTree`].
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

impl Dir {
    // The direction a search for a key ordered `ord` relative to a node continues in.
    #[inline]
    fn of(ord: Ordering) -> Option<Dir> {
        match ord {
            Ordering::Less => Some(Dir::Left),
            Ordering::Equal => None,
            Ordering::Greater => Some(Dir::Right),
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    role: Role<T>,
    _unpin: PhantomPinned,
}

enum Role<T: ?Sized> {
    Free,
    Occupant(TreeLinks<T>),
    Duplicate(RingLinks<T>),
}

struct TreeLinks<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    // Head (oldest member) of the duplicate ring.
    dups: Link<T>,
}

struct RingLinks<T: ?Sized> {
    next: NonNull<T>,
    prev: NonNull<T>,
    // Set on the ring head only.
    occupant: Link<T>,
}

type Link<T> = Option<NonNull<T>>;

#[inline]
unsafe fn links<'a, T>(node: NonNull<T>) -> &'a Links<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe { T::links(node).as_ref() }
}

#[inline]
unsafe fn links_mut<'a, T>(node: NonNull<T>) -> &'a mut Links<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe { T::links(node).as_mut() }
}

impl<T> SplayTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> SplayTree<T> {
        SplayTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree, duplicates included.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if every structural invariant of the tree holds.
    ///
    /// This walks the whole tree without splaying and is meant as a testing aid.
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Walks the whole tree and reports the first broken invariant, if any.
    ///
    /// The walk follows parent links instead of recursing, so it runs in constant stack space on
    /// any shape the tree can take.
    pub fn check(&self) -> Result<(), Violation> {
        let Some(root) = self.root else {
            return self.check_len(0);
        };

        unsafe {
            Self::check_link(root, None)?;

            let mut prev: Option<&T::Key> = None;
            let mut counted = 0;
            let mut cur = self.descend_checked(root, Dir::Left)?;

            // In-order walk. Occupant keys must strictly increase.
            loop {
                let key = cur.as_ref().key();
                if prev.is_some_and(|prev| prev >= key) {
                    return Err(Violation::KeyOrder);
                }
                prev = Some(key);

                counted += 1 + self.check_ring(cur)?;
                if counted > self.len {
                    return self.check_len(counted);
                }

                if let Some(right) = links(cur).right() {
                    Self::check_link(right, Some(cur))?;
                    cur = self.descend_checked(right, Dir::Left)?;
                    continue;
                }

                loop {
                    let Some(parent) = links(cur).parent() else {
                        return self.check_len(counted);
                    };

                    let from_left = links(parent).left() == Some(cur);
                    cur = parent;
                    if from_left {
                        break;
                    }
                }
            }
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        if let Err(violation) = self.check() {
            panic!("splay tree invariant violated: {violation}");
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

    // Checks that `node` is an occupant whose parent link points at `parent`.
    unsafe fn check_link(node: NonNull<T>, parent: Link<T>) -> Result<(), Violation> {
        match unsafe { links(node).role() } {
            Role::Occupant(tree) if tree.parent == parent => Ok(()),
            Role::Occupant(_) => Err(Violation::ParentLink),
            _ => Err(Violation::Role),
        }
    }

    // Follows `dir` children from the checked occupant `node` as far as they go, checking each
    // link on the way down.
    unsafe fn descend_checked(
        &self,
        node: NonNull<T>,
        dir: Dir,
    ) -> Result<NonNull<T>, Violation> {
        let mut cur = node;
        let mut depth = 0;

        unsafe {
            while let Some(next) = links(cur).child(dir) {
                Self::check_link(next, Some(cur))?;

                depth += 1;
                if depth > self.len {
                    return Err(Violation::ParentLink);
                }

                cur = next;
            }
        }

        Ok(cur)
    }

    // Checks the duplicate ring of the occupant `node`, returning its length.
    unsafe fn check_ring(&self, node: NonNull<T>) -> Result<usize, Violation> {
        unsafe {
            let Some(head) = links(node).dups() else {
                return Ok(0);
            };

            let key = node.as_ref().key();
            let mut count = 0;
            let mut cur = head;

            loop {
                let Role::Duplicate(ring) = links(cur).role() else {
                    return Err(Violation::Role);
                };

                let expected_occupant = (cur == head).then_some(node);
                if ring.occupant != expected_occupant {
                    return Err(Violation::DuplicateRing);
                }

                match links(ring.next).role() {
                    Role::Duplicate(next) if next.prev == cur => (),
                    _ => return Err(Violation::DuplicateRing),
                }

                if cur.as_ref().key() != key {
                    return Err(Violation::KeyOrder);
                }

                count += 1;
                if count > self.len {
                    return Err(Violation::DuplicateRing);
                }

                cur = ring.next;
                if cur == head {
                    return Ok(count);
                }
            }
        }
    }

    /// Returns a reference to the oldest element with a key equal to `key`, splaying it to the
    /// root.
    pub fn find<Q>(&mut self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.splay_to(key)?;

        unsafe {
            match key.cmp(root.as_ref().key().borrow()) {
                Ordering::Equal => Some(Pin::new_unchecked(root.as_ref())),
                _ => None,
            }
        }
    }

    /// Returns `true` if the tree holds an element with a key equal to `key`.
    ///
    /// Like [`find`](Self::find), this splays the tree.
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns a reference to the oldest element with a key equal to `key`.
    ///
    /// Unlike [`find`](Self::find) this does not restructure the tree, so repeated lookups do not
    /// benefit from the splay tree's amortized bounds.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match Dir::of(key.cmp(cur.as_ref().key().borrow())) {
                    Some(dir) => opt_cur = links(cur).child(dir),
                    None => return Some(cur),
                }
            }
        }
    }

    /// Returns the oldest element with the minimum key, splaying it to the root.
    pub fn first(&mut self) -> Option<Pin<&T>> {
        let root = self.splay_extreme(Dir::Left)?;
        unsafe { Some(Pin::new_unchecked(root.as_ref())) }
    }

    /// Returns the oldest element with the maximum key, splaying it to the root.
    pub fn last(&mut self) -> Option<Pin<&T>> {
        let root = self.splay_extreme(Dir::Right)?;
        unsafe { Some(Pin::new_unchecked(root.as_ref())) }
    }

    /// Returns the element that follows `node` in iteration order.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`.
    pub unsafe fn successor(&self, node: &T) -> Option<Pin<&T>> {
        let next = unsafe { Self::successor_raw(NonNull::from(node))? };
        unsafe { Some(Pin::new_unchecked(next.as_ref())) }
    }

    /// Returns the element that precedes `node` in iteration order.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`.
    pub unsafe fn predecessor(&self, node: &T) -> Option<Pin<&T>> {
        let prev = unsafe { Self::predecessor_raw(NonNull::from(node))? };
        unsafe { Some(Pin::new_unchecked(prev.as_ref())) }
    }

    /// Inserts an element with a key not already present in the tree.
    ///
    /// If an element with an equal key exists, `item` is handed back inside the error and the
    /// tree's contents are unchanged.
    pub fn insert(&mut self, item: T::Handle) -> Result<NonNull<T>, InsertError<T::Handle>> {
        self.insert_with(item, false)
    }

    /// Inserts an element, allowing its key to equal that of elements already in the tree.
    ///
    /// An element with a duplicate key queues behind the existing elements with that key.
    pub fn insert_multi(&mut self, item: T::Handle) -> Result<NonNull<T>, InsertError<T::Handle>> {
        self.insert_with(item, true)
    }

    fn insert_with(
        &mut self,
        item: T::Handle,
        allow_dups: bool,
    ) -> Result<NonNull<T>, InsertError<T::Handle>> {
        let ptr = T::into_ptr(item);

        unsafe {
            if links(ptr).is_linked() {
                return Err(InsertError::new(ErrorKind::AlreadyLinked, T::from_ptr(ptr)));
            }

            let Some(root) = self.root else {
                // Tree is empty. Set `item` as the root and return.
                links_mut(ptr).set_role(Role::Occupant(TreeLinks::new(None)));
                self.root = Some(ptr);
                self.len += 1;
                return Ok(ptr);
            };

            let key = ptr.as_ref().key();
            let root = self.splay(root, |node| key.cmp(node.key()));

            match Dir::of(key.cmp(root.as_ref().key())) {
                Some(dir) => self.connect_new_root(ptr, root, dir),
                None if allow_dups => self.push_duplicate(root, ptr),
                None => return Err(InsertError::new(ErrorKind::DuplicateKey, T::from_ptr(ptr))),
            }
        }

        self.len += 1;
        Ok(ptr)
    }

    // Makes `node` the root above the freshly splayed `old_root`. `dir` is the side of
    // `old_root` that `node`'s key falls on.
    unsafe fn connect_new_root(&mut self, node: NonNull<T>, old_root: NonNull<T>, dir: Dir) {
        unsafe {
            let across = links_mut(old_root).set_child(dir, None);
            links_mut(old_root).set_parent(Some(node));

            let mut tree = TreeLinks::new(None);
            tree.children[dir as usize] = across;
            tree.children[!dir as usize] = Some(old_root);
            links_mut(node).set_role(Role::Occupant(tree));
            self.maybe_set_parent(across, Some(node));

            self.root = Some(node);
        }
    }

    /// Removes the oldest element with a key equal to `key`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.splay_to(key)?;

        unsafe {
            match key.cmp(root.as_ref().key().borrow()) {
                Ordering::Equal => Some(self.remove_root(root)),
                _ => None,
            }
        }
    }

    /// Removes an arbitrary element from the tree.
    ///
    /// Removing a duplicate takes O(1) time and leaves the tree shape untouched.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_node(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            if links(node).is_duplicate() {
                self.unlink_duplicate(node);
                links_mut(node).clear();
                self.len -= 1;
                return T::from_ptr(node);
            }

            let root = self.root.expect("`node` must be an element of the tree");
            let key = node.as_ref().key();
            let root = self.splay(root, |other| key.cmp(other.key()));
            debug_assert_eq!(root, node, "occupants have unique keys");

            self.remove_root(root)
        }
    }

    /// Removes the oldest element with the minimum key.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let root = self.splay_extreme(Dir::Left)?;
        unsafe { Some(self.remove_root(root)) }
    }

    /// Removes the oldest element with the maximum key.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let root = self.splay_extreme(Dir::Right)?;
        unsafe { Some(self.remove_root(root)) }
    }

    // Removes the root occupant. If it has duplicates, the oldest one takes over its position;
    // otherwise the root is unlinked from the tree.
    unsafe fn remove_root(&mut self, root: NonNull<T>) -> T::Handle {
        debug_assert_eq!(self.root, Some(root));

        unsafe {
            if !self.promote_duplicate(root) {
                self.remove_from_tree(root);
            }

            links_mut(root).clear();
            self.len -= 1;
            T::from_ptr(root)
        }
    }

    // Joins the subtrees of the root and discards it. The left subtree is splayed on its maximum,
    // which then has no right child and can adopt the right subtree.
    unsafe fn remove_from_tree(&mut self, root: NonNull<T>) {
        unsafe {
            let left = links(root).left();
            let right = links(root).right();

            let Some(left) = left else {
                self.maybe_set_parent(right, None);
                self.root = right;
                return;
            };

            links_mut(left).set_parent(None);
            let new_root = self.splay(left, |_| Ordering::Greater);
            debug_assert!(links(new_root).right().is_none());

            links_mut(new_root).set_right(right);
            self.maybe_set_parent(right, Some(new_root));
            self.root = Some(new_root);
        }
    }

    /// Returns an iterator over the elements of the tree in ascending key order.
    ///
    /// Elements with equal keys are yielded in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing at the first element of the tree.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::first(self)
    }

    /// Returns a cursor pointing at the last element of the tree.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::last(self)
    }

    /// Returns an editing cursor pointing at the first element of the tree.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::first(self)
    }

    /// Returns an editing cursor pointing at the last element of the tree.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::last(self)
    }

    /// Returns the elements with keys in `begin..=end`, in ascending order.
    ///
    /// The range starts at the first element not less than `begin` and stops before the first
    /// element greater than `end`. If `begin > end` the range is empty.
    pub fn equal_range<Q>(&mut self, begin: &Q, end: &Q) -> Range<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if begin > end {
            return Range::empty(Dir::Right);
        }

        unsafe {
            let first = self.bound(begin, Dir::Right, |ord| ord == Ordering::Greater);
            let stop = self.bound(end, Dir::Right, |ord| ord != Ordering::Less);
            Range::new(first, stop, Dir::Right)
        }
    }

    /// Returns the elements with keys in `rend..=rbegin`, in descending order.
    ///
    /// The range starts at the last element not greater than `rbegin` and stops before the last
    /// element less than `rend`. If `rbegin < rend` the range is empty.
    pub fn equal_rrange<Q>(&mut self, rbegin: &Q, rend: &Q) -> Range<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if rbegin < rend {
            return Range::empty(Dir::Left);
        }

        unsafe {
            let first = self.bound(rbegin, Dir::Left, |ord| ord == Ordering::Less);
            let stop = self.bound(rend, Dir::Left, |ord| ord != Ordering::Greater);
            Range::new(first, stop, Dir::Left)
        }
    }

    // Splays `key` and returns the iteration position of the splayed group, stepped once in `dir`
    // if `step_past` holds for the ordering of `key` against the splayed root.
    //
    // The position is the group's first element in iteration direction: the occupant when walking
    // right, the newest duplicate when walking left.
    unsafe fn bound<Q>(&mut self, key: &Q, dir: Dir, step_past: impl Fn(Ordering) -> bool) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.splay_to(key)?;

        unsafe {
            let group = if step_past(key.cmp(root.as_ref().key().borrow())) {
                Self::tree_step(root, dir)?
            } else {
                root
            };

            match dir {
                Dir::Right => Some(group),
                Dir::Left => Some(Self::last_in_group(group)),
            }
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.clear_with(drop);
    }

    /// Clears the tree, passing every removed element to `f`.
    pub fn clear_with(&mut self, mut f: impl FnMut(T::Handle)) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let (cur, parent) = self.min_in_subtree(cur);
                let parent = parent.or_else(|| links(cur).parent());

                let right = links(cur).right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                while let Some(dup) = self.pop_front_dup(cur) {
                    links_mut(dup).clear();
                    self.len -= 1;
                    f(T::from_ptr(dup));
                }

                links_mut(cur).clear();
                self.len -= 1;
                f(T::from_ptr(cur));

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Splaying ===============================================================

    fn splay_to<Q>(&mut self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.root?;
        Some(unsafe { self.splay(root, |node| key.cmp(node.key().borrow())) })
    }

    fn splay_extreme(&mut self, dir: Dir) -> Link<T> {
        let root = self.root?;
        let ord = match dir {
            Dir::Left => Ordering::Less,
            Dir::Right => Ordering::Greater,
        };

        Some(unsafe { self.splay(root, |_| ord) })
    }

    // Top-down splay of the subtree at `root` toward the key described by `cmp`, which orders the
    // key against a node. The final node becomes the root of the tree.
    //
    // The nodes passed on the way down are gathered into two side trees: `sides[Left]` holds
    // everything less than the key, `sides[Right]` everything greater. `hooks[s]` is the node of
    // side tree `s` that receives the next node moved to that side; it is the maximum of the left
    // side and the minimum of the right side.
    unsafe fn splay<F>(&mut self, root: NonNull<T>, mut cmp: F) -> NonNull<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut sides: [Link<T>; 2] = [None; 2];
        let mut hooks: [Link<T>; 2] = [None; 2];
        let mut t = root;

        unsafe {
            loop {
                let ord = cmp(t.as_ref());
                let Some(dir) = Dir::of(ord) else {
                    break;
                };

                let Some(mut next) = links(t).child(dir) else {
                    break;
                };

                if cmp(next.as_ref()) == ord {
                    // Zig-zig: rotate `next` above `t` before moving on.
                    let across = links(next).child(!dir);
                    links_mut(t).set_child(dir, across);
                    self.maybe_set_parent(across, Some(t));

                    links_mut(next).set_child(!dir, Some(t));
                    links_mut(t).set_parent(Some(next));

                    t = next;
                    next = match links(t).child(dir) {
                        Some(n) => n,
                        None => break,
                    };
                }

                // Move `t` to the side tree opposite the descent. Its `dir` child is stale until
                // the next node lands on that side or the trees are reassembled.
                let side = !dir;
                match hooks[side as usize] {
                    Some(hook) => {
                        links_mut(hook).set_child(dir, Some(t));
                        links_mut(t).set_parent(Some(hook));
                    }
                    None => sides[side as usize] = Some(t),
                }
                hooks[side as usize] = Some(t);

                t = next;
            }

            // Reassemble: `t`'s subtrees go under the hooks and the side trees become its
            // children.
            for side in [Dir::Left, Dir::Right] {
                let Some(hook) = hooks[side as usize] else {
                    continue;
                };

                let inner = links(t).child(side);
                links_mut(hook).set_child(!side, inner);
                self.maybe_set_parent(inner, Some(hook));

                let outer = sides[side as usize];
                links_mut(t).set_child(side, outer);
                self.maybe_set_parent(outer, Some(t));
            }

            links_mut(t).set_parent(None);
        }

        self.root = Some(t);
        t
    }

    // Support methods ========================================================

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { links_mut(node).set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`.
    unsafe fn replace_child(&mut self, parent: NonNull<T>, old_child: NonNull<T>, new_child: Link<T>) {
        unsafe {
            let dir = if links(parent).left() == Some(old_child) {
                Dir::Left
            } else {
                debug_assert_eq!(
                    links(parent).right(),
                    Some(old_child),
                    "`old_child` must be a child of `parent`"
                );
                Dir::Right
            };

            links_mut(parent).set_child(dir, new_child);
        }
    }

    // Returns the minimum node in the subtree.
    //
    // If the subtree root is not the minimum, also returns the minimum node's parent.
    #[inline]
    unsafe fn min_in_subtree(&self, root: NonNull<T>) -> (NonNull<T>, Option<NonNull<T>>) {
        let mut parent = None;
        let mut cur = root;

        while let Some(left) = unsafe { links(cur).left() } {
            parent = Some(cur);
            cur = left;
        }

        (cur, parent)
    }

    // Returns the occupant at the far `dir` end of the tree without splaying.
    fn extreme_occupant(&self, dir: Dir) -> Link<T> {
        let mut cur = self.root?;

        while let Some(child) = unsafe { links(cur).child(dir) } {
            cur = child;
        }

        Some(cur)
    }

    // Returns the occupant of the group that follows (`Right`) or precedes (`Left`) the group of
    // the occupant `node`.
    unsafe fn tree_step(node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = links(node).child(dir) {
                let mut cur = child;
                while let Some(next) = links(cur).child(!dir) {
                    cur = next;
                }
                return Some(cur);
            }

            let mut cur = node;
            while let Some(parent) = links(cur).parent() {
                if links(parent).child(!dir) == Some(cur) {
                    return Some(parent);
                }
                cur = parent;
            }

            None
        }
    }

    // Returns the newest element in the group of the occupant `node`.
    unsafe fn last_in_group(node: NonNull<T>) -> NonNull<T> {
        unsafe {
            match links(node).dups() {
                Some(head) => links(head).ring().prev,
                None => node,
            }
        }
    }

    pub(crate) fn first_raw(&self) -> Link<T> {
        self.extreme_occupant(Dir::Left)
    }

    pub(crate) fn last_raw(&self) -> Link<T> {
        let occupant = self.extreme_occupant(Dir::Right)?;
        Some(unsafe { Self::last_in_group(occupant) })
    }

    pub(crate) unsafe fn successor_raw(node: NonNull<T>) -> Link<T> {
        unsafe {
            match links(node).role() {
                Role::Occupant(tree) => tree.dups.or_else(|| Self::tree_step(node, Dir::Right)),
                Role::Duplicate(ring) => match links(ring.next).ring().occupant {
                    // Wrapped around to the head: the group is exhausted.
                    Some(occupant) => Self::tree_step(occupant, Dir::Right),
                    None => Some(ring.next),
                },
                Role::Free => unreachable!("`node` must be an element of the tree"),
            }
        }
    }

    pub(crate) unsafe fn predecessor_raw(node: NonNull<T>) -> Link<T> {
        unsafe {
            match links(node).role() {
                Role::Occupant(_) => {
                    let prev = Self::tree_step(node, Dir::Left)?;
                    Some(Self::last_in_group(prev))
                }
                Role::Duplicate(ring) => Some(ring.occupant.unwrap_or(ring.prev)),
                Role::Free => unreachable!("`node` must be an element of the tree"),
            }
        }
    }
}

impl<T> Default for SplayTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for SplayTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for SplayTree<T>
where
    T: TreeNode<Links<T>> + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: ?Sized> TreeLinks<T> {
    const fn new(parent: Link<T>) -> Self {
        TreeLinks {
            parent,
            children: [None; 2],
            dups: None,
        }
    }
}

impl<T: ?Sized> Clone for TreeLinks<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for TreeLinks<T> {}

impl<T: ?Sized> Clone for RingLinks<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for RingLinks<T> {}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                role: Role::Free,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns `true` if the element owning these links is currently in a tree.
    pub fn is_linked(&self) -> bool {
        !matches!(self.role(), Role::Free)
    }

    #[inline]
    fn role(&self) -> &Role<T> {
        unsafe { &(*self.inner.get()).role }
    }

    #[inline]
    fn set_role(&mut self, role: Role<T>) -> Role<T> {
        mem::replace(&mut self.inner.get_mut().role, role)
    }

    #[inline]
    fn clear(&mut self) {
        self.set_role(Role::Free);
    }

    #[inline]
    fn is_duplicate(&self) -> bool {
        matches!(self.role(), Role::Duplicate(_))
    }

    #[inline]
    fn tree(&self) -> &TreeLinks<T> {
        match self.role() {
            Role::Occupant(tree) => tree,
            _ => unreachable!("links do not belong to a tree occupant"),
        }
    }

    #[inline]
    fn tree_mut(&mut self) -> &mut TreeLinks<T> {
        match &mut self.inner.get_mut().role {
            Role::Occupant(tree) => tree,
            _ => unreachable!("links do not belong to a tree occupant"),
        }
    }

    #[inline]
    fn ring(&self) -> &RingLinks<T> {
        match self.role() {
            Role::Duplicate(ring) => ring,
            _ => unreachable!("links do not belong to a duplicate"),
        }
    }

    #[inline]
    fn ring_mut(&mut self) -> &mut RingLinks<T> {
        match &mut self.inner.get_mut().role {
            Role::Duplicate(ring) => ring,
            _ => unreachable!("links do not belong to a duplicate"),
        }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        self.tree().parent
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        self.tree().children[dir as usize]
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn dups(&self) -> Link<T> {
        self.tree().dups
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.tree_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.tree_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_dups(&mut self, dups: Link<T>) -> Link<T> {
        mem::replace(&mut self.tree_mut().dups, dups)
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role() {
            Role::Free => f.write_str("Free"),
            Role::Occupant(tree) => f
                .debug_struct("Occupant")
                .field("parent", &tree.parent)
                .field("left", &tree.children[Dir::Left as usize])
                .field("right", &tree.children[Dir::Right as usize])
                .field("dups", &tree.dups)
                .finish(),
            Role::Duplicate(ring) => f
                .debug_struct("Duplicate")
                .field("next", &ring.next)
                .field("prev", &ring.prev)
                .field("occupant", &ring.occupant)
                .finish(),
        }
    }
}
