use core::{borrow::Borrow, fmt, pin::Pin, ptr::NonNull};

use crate::{links, InsertError, Iter, Links, Range, SplayTree, TreeNode, Violation};

/// An intrusive priority queue that accepts equal keys.
///
/// The queue is double ended: both the minimum and the maximum can be peeked and popped. Among
/// elements with equal keys, the one inserted first is popped first from either end.
pub struct SplayQueue<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: SplayTree<T>,
}

impl<T> SplayQueue<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Creates a new, empty `SplayQueue`.
    pub const fn new() -> Self {
        SplayQueue {
            tree: SplayTree::new(),
        }
    }

    /// Returns `true` if the queue contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the queue.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Pushes `item` into the queue behind any elements with an equal key.
    ///
    /// This only fails if `item` is already linked into a container.
    #[inline]
    pub fn push(&mut self, item: T::Handle) -> Result<NonNull<T>, InsertError<T::Handle>> {
        self.tree.insert_multi(item)
    }

    /// Returns the oldest element with the minimum key.
    #[inline]
    pub fn min(&mut self) -> Option<Pin<&T>> {
        self.tree.first()
    }

    /// Returns the oldest element with the maximum key.
    #[inline]
    pub fn max(&mut self) -> Option<Pin<&T>> {
        self.tree.last()
    }

    /// Removes and returns the oldest element with the minimum key.
    #[inline]
    pub fn pop_min(&mut self) -> Option<T::Handle> {
        self.tree.pop_first()
    }

    /// Removes and returns the oldest element with the maximum key.
    #[inline]
    pub fn pop_max(&mut self) -> Option<T::Handle> {
        self.tree.pop_last()
    }

    /// Returns `true` if the queue contains an element with a key equal to `key`.
    #[inline]
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(key)
    }

    /// Removes an arbitrary element from the queue.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`.
    #[inline]
    pub unsafe fn erase(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe { self.tree.remove_node(node) }
    }

    /// Changes the key of `node` with `f` and restores its position in the queue.
    ///
    /// The element is requeued behind any elements that share its new key.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`, and `f` must not move out of the element or touch its
    /// links.
    pub unsafe fn update<F>(&mut self, node: NonNull<T>, f: F)
    where
        F: FnOnce(Pin<&mut T>),
    {
        unsafe {
            let handle = self.tree.remove_node(node);
            let mut ptr = T::into_ptr(handle);
            f(Pin::new_unchecked(ptr.as_mut()));

            debug_assert!(!links(ptr).is_linked());
            let requeued = self.tree.insert_multi(T::from_ptr(ptr));
            debug_assert!(requeued.is_ok());
        }
    }

    /// Returns an iterator over the queue from the minimum to the maximum key.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Returns the elements with keys in `begin..=end` in ascending order.
    #[inline]
    pub fn equal_range<Q>(&mut self, begin: &Q, end: &Q) -> Range<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.equal_range(begin, end)
    }

    /// Returns the elements with keys in `rend..=rbegin` in descending order.
    #[inline]
    pub fn equal_rrange<Q>(&mut self, rbegin: &Q, rend: &Q) -> Range<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.equal_rrange(rbegin, rend)
    }

    #[inline]
    pub fn validate(&self) -> bool {
        self.tree.validate()
    }

    #[inline]
    pub fn check(&self) -> Result<(), Violation> {
        self.tree.check()
    }

    /// Clears the queue, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Clears the queue, passing every removed element to `f`.
    #[inline]
    pub fn clear_with(&mut self, f: impl FnMut(T::Handle)) {
        self.tree.clear_with(f);
    }
}

impl<T> Default for SplayQueue<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SplayQueue<T>
where
    T: TreeNode<Links<T>> + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{prelude::v1::*, vec};

    use super::*;
    use crate::model::TestNode;

    fn ids(queue: &SplayQueue<TestNode>) -> Vec<(u32, usize)> {
        queue.iter().map(|n| (n.key, n.id)).collect()
    }

    #[test]
    fn pop_max_is_fifo_among_equals() {
        let mut queue: SplayQueue<TestNode> = SplayQueue::new();
        for (id, key) in [7, 2, 7, 7, 1].into_iter().enumerate() {
            queue.push(TestNode::with_id(key, id)).unwrap();
        }

        assert_eq!(queue.max().map(|n| n.id), Some(0));
        let popped: Vec<usize> = core::iter::from_fn(|| queue.pop_max())
            .map(|n| n.id)
            .take(3)
            .collect();
        assert_eq!(popped, vec![0, 2, 3]);
        assert_eq!(queue.min().map(|n| n.key), Some(1));
        assert!(queue.validate());
    }

    #[test]
    fn erase_duplicate_leaves_tree_alone() {
        let mut queue: SplayQueue<TestNode> = SplayQueue::new();
        queue.push(TestNode::with_id(3, 0)).unwrap();
        let middle = queue.push(TestNode::with_id(3, 1)).unwrap();
        queue.push(TestNode::with_id(3, 2)).unwrap();
        queue.push(TestNode::with_id(9, 3)).unwrap();

        let root_before = queue.tree.root;
        let erased = unsafe { queue.erase(middle) };
        assert_eq!(erased.id, 1);
        assert_eq!(queue.tree.root, root_before);
        assert_eq!(ids(&queue), vec![(3, 0), (3, 2), (9, 3)]);
        assert!(queue.validate());
    }

    #[test]
    fn update_requeues_behind_equals() {
        let mut queue: SplayQueue<TestNode> = SplayQueue::new();
        let first = queue.push(TestNode::with_id(5, 0)).unwrap();
        queue.push(TestNode::with_id(2, 1)).unwrap();
        queue.push(TestNode::with_id(2, 2)).unwrap();

        unsafe { queue.update(first, |node| node.get_unchecked_mut().key = 2) };

        assert_eq!(ids(&queue), vec![(2, 1), (2, 2), (2, 0)]);
        assert!(queue.validate());
    }

    #[test]
    fn ranges_cover_whole_groups() {
        let mut queue: SplayQueue<TestNode> = SplayQueue::new();
        for (id, key) in [4, 1, 4, 6, 9, 6, 2].into_iter().enumerate() {
            queue.push(TestNode::with_id(key, id)).unwrap();
        }

        let up: Vec<usize> = queue.equal_range(&3, &6).map(|n| n.id).collect();
        assert_eq!(up, vec![0, 2, 3, 5]);

        let down: Vec<usize> = queue.equal_rrange(&6, &3).map(|n| n.id).collect();
        assert_eq!(down, vec![5, 3, 2, 0]);

        assert_eq!(queue.equal_range(&7, &8).count(), 0);
        assert_eq!(queue.equal_range(&6, &3).count(), 0);
        assert_eq!(queue.equal_rrange(&3, &6).count(), 0);
        assert!(queue.validate());
    }
}
